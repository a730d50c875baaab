//! Terminal UI for STORECAST.
//!
//! This crate provides the Ratatui-based dashboard and the request
//! orchestration that drives it:
//!
//! - [`SessionState`] - single source of truth for everything on screen,
//!   mutated only through [`FetchEvent`] transitions
//! - [`Controller`] - spawns the async episodes (health check, catalog load,
//!   forecast + conditional explanation) and reports completions as events
//! - [`chart`] - pure derivation of the chart series from session state
//! - [`App`] - the event loop tying keys, fetch events, and rendering together
//!
//! ## Hotkeys
//!
//! - `Up`/`Down` or `j`/`k` - move through the store list
//! - `Enter` - select the highlighted store and fetch its forecast
//! - `r` - re-run the health check and reload the catalog
//! - `?` or `h` - help overlay
//! - `q` - quit
//! - `Esc` - dismiss overlay

pub mod app;
pub mod chart;
pub mod controller;
pub mod event;
pub mod session;
pub mod view;

pub use app::{App, AppResult};
pub use chart::{ChartPoint, to_chart_series};
pub use controller::Controller;
pub use event::{AppEvent, InputHandler};
pub use session::{FetchEvent, HealthStatus, SessionState};

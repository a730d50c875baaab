//! # storecast-core
//!
//! Core types, errors, and utilities for the STORECAST dashboard.
//!
//! This crate provides:
//! - [`StorecastError`] - Error types shared across STORECAST crates
//! - [`logging`] - Tracing setup and log management utilities
//! - [`config`] - Dashboard configuration (API base URL, timeouts)
//! - [`types`] - Shared type definitions for stores and forecasts
//!
//! ## Example
//!
//! ```no_run
//! use storecast_core::{config::AppConfig, logging};
//!
//! fn main() -> storecast_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!     let config = AppConfig::load(None)?.apply_env();
//!     tracing::info!(api = %config.api_base_url, "configured");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use config::AppConfig;
pub use error::{Result, StorecastError};
pub use logging::{LogGuard, init_logging};
pub use types::{DEFAULT_NEXT_PERIOD_LABEL, ForecastBundle, HistoryPoint, Store, StoreId};

//! # storecast-client
//!
//! Typed HTTP client for the STORECAST forecasting service.
//!
//! This crate provides:
//! - [`ForecastApi`] - Trait covering the four remote operations
//!   (health check, store catalog, forecast, explanation)
//! - [`ApiClient`] - reqwest-backed implementation with bounded timeouts
//! - [`TransportError`] - The single error type crossing the HTTP boundary
//!
//! Operations are side-effect-free with respect to dashboard state; they
//! only talk to the remote boundary and return data or fail.
//!
//! ## Example
//!
//! ```no_run
//! use storecast_client::{ApiClient, ForecastApi};
//! use storecast_core::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_config(&AppConfig::default())?;
//! if client.check_health().await? {
//!     let stores = client.list_stores().await?;
//!     println!("{} stores available", stores.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;

// Re-export main types
pub use api::{ApiClient, ForecastApi};
pub use error::{Result, TransportError};

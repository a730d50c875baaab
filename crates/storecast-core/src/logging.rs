//! Tracing setup for the dashboard.
//!
//! A full-screen TUI owns stdout, so nothing may be printed there: the
//! human-readable stream goes to stderr and the durable record is a daily
//! JSON-lines file under `~/.storecast/logs/`. Call [`init_logging`] once
//! at startup and hold the returned [`LogGuard`] until exit.
//!
//! ```no_run
//! use storecast_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//! tracing::debug!(store_id = "2327", "forecast requested");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{Result, StorecastError};

/// Keeps the file writer alive; dropping it flushes pending entries.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Wire up the two logging layers: a JSON-lines daily file in `log_dir`
/// (defaulting to `~/.storecast/logs/`) and a compact stderr stream.
///
/// `verbose` lowers the default level from `info` to `debug`; an explicit
/// `RUST_LOG` wins over both.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| StorecastError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "storecast.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("storecast={default_level}")));

    // Durable record: JSON lines, one file per day
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    // Operator stream; stdout belongs to the TUI
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Console-only logging for tests; safe to call more than once.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// `~/.storecast/logs/`, resolved against the current home directory.
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| StorecastError::Internal {
        message: "Could not determine home directory".into(),
    })?;

    Ok(home.join(".storecast").join("logs"))
}

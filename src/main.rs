//! STORECAST - Store Sales Forecast Dashboard
//!
//! A terminal dashboard for store-level sales forecasts: pick a store, see
//! the projected next-period sales, the recent history, and an AI-generated
//! explanation of the forecast.
//!
//! ## Usage
//!
//! ```bash
//! # Start the dashboard against the configured service
//! storecast
//!
//! # Point at a specific service instance
//! storecast --api-url http://forecast.internal:8080
//!
//! # With verbose logging
//! storecast -v
//! ```

use std::io::Write;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use storecast_client::ApiClient;
use storecast_core::{AppConfig, LogGuard, init_logging};
use storecast_tui::App;

/// STORECAST Sales Forecast Dashboard
///
/// A terminal interface for browsing store-level sales forecasts
/// served by the forecasting service.
#[derive(Parser, Debug)]
#[command(name = "storecast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.storecast/logs/)
    #[arg(long)]
    log_dir: Option<std::path::PathBuf>,

    /// Base URL of the forecasting service (overrides config and env)
    #[arg(long)]
    api_url: Option<String>,

    /// Path to the configuration file (defaults to ~/.storecast/config.yaml)
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            eprintln!("Error: {}", e);
            if let Some(guidance) = e.guidance() {
                eprintln!("Hint: {}", guidance);
            }
            return ExitCode::from(1);
        }
    };

    info!(api = %config.api_base_url, "starting STORECAST dashboard");

    match run_app(&config).await {
        Ok(()) => {
            info!("STORECAST dashboard exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("STORECAST dashboard error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the panic message.
///
/// This ensures that even if the application panics while in raw mode with the
/// alternate screen enabled, the terminal will be properly restored so the user
/// can see the panic message and continue using their terminal.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::execute!(stdout, crossterm::cursor::Show)?;
    stdout.flush()?;

    Ok(())
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> storecast_core::Result<LogGuard> {
    let debug = cli.verbose > 0;
    init_logging(cli.log_dir.clone(), debug)
}

/// Resolve configuration: file, then environment, then CLI flags.
fn load_config(cli: &Cli) -> storecast_core::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?.apply_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url);
    }
    Ok(config)
}

/// Run the TUI application.
async fn run_app(config: &AppConfig) -> storecast_tui::AppResult<()> {
    let client = ApiClient::from_config(config)?;
    let mut app = App::new(Arc::new(client));
    app.run().await
}

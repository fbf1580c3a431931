//! DutyCalls - ThingsDB module for the DutyCalls ticketing API
//!
//! This binary is started by ThingsDB and speaks the module package
//! protocol on stdin/stdout. Credentials arrive from ThingsDB through the
//! module configuration.
//!
//! # Configuration
//!
//! Optional environment variables (or a `.env` file):
//!
//! - `DUTYCALLS_HTTP_TIMEOUT_SECS`: timeout for calls to the DutyCalls API
//! - `RUST_LOG`: log filter (e.g., `dutycalls=debug`)

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use dutycalls::{client, config, dispatcher, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the package protocol, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dutycalls=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting DutyCalls module v{}", env!("CARGO_PKG_VERSION"));

    let settings = config::Settings::from_env().context("Failed to load settings")?;
    tracing::debug!(?settings, "Settings loaded");

    let client = client::DutyCallsClient::new(&settings).context("Failed to create DutyCalls client")?;
    let dispatcher = dispatcher::Dispatcher::new(config::CredentialStore::new(), client);

    tracing::info!("Waiting for packages on stdin");

    server::Module::new(dispatcher, tokio::io::stdin(), tokio::io::stdout())
        .run()
        .await
        .context("Module stopped on a channel error")?;

    tracing::info!("Module shutting down");

    Ok(())
}

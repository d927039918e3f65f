//! # Folio CLI
//!
//! Command-line client for the blog backend. Every command is an action
//! boundary: failures become one notification line and a non-zero exit.

use clap::Parser;

mod cli;
mod commands;
mod confirm;
mod config;
mod files;
mod output;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    init_telemetry(&TelemetryConfig::from_env(cli.verbose));

    if let Err(error) = run(cli).await {
        eprintln!("folio: {error:#}");
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let state = AppState::new(&config).await?;

    let result = commands::dispatch(cli.command, &state, cli.format).await;

    if state.session_expired() {
        tracing::warn!("Session credential discarded");
        eprintln!("folio: your session has expired, sign in again with `folio login`");
    }
    result
}

//! # Auditpipe CLI
//!
//! Entry point for the audit ingestion pipeline.
//!
//! Provides:
//! - Configuration loading and validation
//! - Pipeline wiring and lifecycle management
//! - Graceful shutdown handling

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::{LogController, ObservabilityConfig};
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_controller = init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "auditpipe starting");

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args, log_controller).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<LogController> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    // the metrics exporter is installed by `run` once the port is known
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
    })
}

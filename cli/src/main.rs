//! vault-renew - Vault token pre-flight check
//!
//! Looks up the cached Vault token and, when it has less than the minimum
//! TTL left, drives an interactive `vault login` to completion under a
//! bounded, escalating timeout.

mod auth;
mod cli;
mod client;
mod config;
mod error;
mod supervisor;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::auth::format_ttl;
use crate::cli::commands::{handle_renew, RenewOutcome};
use crate::cli::Cli;
use crate::config::{env, load_config, load_config_from};
use crate::error::{RenewError, Result};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Run the check
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        if matches!(&e, RenewError::Supervisor(s) if s.is_start_failure()) {
            eprintln!("Is the Vault CLI installed? Use --vault-bin to point at it.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let settings = config.with_overrides(&cli.overrides())?.resolve()?;

    match handle_renew(&settings).await? {
        RenewOutcome::AlreadyFresh { remaining } => {
            tracing::debug!(remaining = %format_ttl(remaining), "No renewal needed");
        },
        RenewOutcome::Renewed {
            previous,
            current,
            report,
        } => {
            tracing::debug!(
                previous = %previous,
                current = %current,
                status = %report.status,
                escalations = ?report.escalations,
                elapsed = ?report.elapsed,
                "Renewal complete"
            );
        },
    }

    Ok(())
}

//! Renolink host daemon
//!
//! Loads settings, runs the file-backed collaborator, performs sensor setup and
//! then delivers an update notification on every scan interval.

mod cli;
mod collaborator;
mod host;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rl_core::constants::paths;
use rl_core::{get_config_path, load_config, setup_entities, validate_config, TokioSleeper};
use rl_protocol::PROTOCOL_VERSION;

use crate::cli::Cli;
use crate::collaborator::FileCoordinator;
use crate::host::Host;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Report file name used when `--report` is not given
const REPORT_FILE: &str = "report.json";

// ============================================================================
// Logging
// ============================================================================

fn log_filter(cli: &Cli) -> EnvFilter {
    match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the subscriber. Returns whether the journal is in use.
fn init_logging(cli: &Cli) -> bool {
    if cli.journald {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(log_filter(cli))
                    .init();
                return true;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(log_filter(cli))
        .init();
    false
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn report_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.report {
        return Ok(path.clone());
    }
    paths::user_config_dir()
        .map(|dir| dir.join(REPORT_FILE))
        .context("Could not determine config directory for the report file")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let journald = init_logging(&cli);

    info!(
        version = VERSION,
        protocol = PROTOCOL_VERSION,
        "renolinkd starting, logging to {}",
        if journald { "systemd journal" } else { "stdout" }
    );

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path().context("Failed to resolve settings path")?,
    };
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    cli.apply_overrides(&mut config);
    validate_config(&config).context("Invalid configuration")?;

    let coordinator = Arc::new(FileCoordinator::new(config.address.clone(), report_path(&cli)?));
    info!(
        address = %config.address,
        device_type = %config.device_type,
        report = %coordinator.report_path().display(),
        scan_interval_secs = config.scan_interval_secs,
        "Configuration loaded"
    );

    if let Err(e) = coordinator.refresh() {
        warn!(error = %e, "Initial refresh failed, continuing");
    }

    let outcome = setup_entities(&config, coordinator.as_ref(), &TokioSleeper).await;
    let bound = outcome.phase.device().is_some();
    let mut host = Host::new(Arc::clone(&coordinator), outcome.entities);
    info!(entities = host.entities().len(), bound, "Setup complete");
    if let Some(info) = host.entities().first().map(|e| e.device_info()) {
        info!(device = %info.name, model = %info.model, hw = %info.hw_version, "Device registered");
    }

    host.notify();
    host.log_readings();

    if cli.once {
        return Ok(());
    }

    host.run(config.scan_interval()).await;
    info!("renolinkd stopped");
    Ok(())
}

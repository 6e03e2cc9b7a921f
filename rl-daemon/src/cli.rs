//! Command-line interface for renolinkd

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "renolinkd")]
#[command(version)]
#[command(about = "Renolink - Renogy BLE telemetry as typed sensor readings")]
#[command(long_about = "Renolink - Renogy BLE telemetry as typed sensor readings

Reads the JSON report written by a BLE decoder, binds sensors to the discovered
device and logs every reading on each scan interval.

EXAMPLES:
    renolinkd                                  Run with ~/.config/renolink/config.json
    renolinkd --device-type battery --once     One setup and update, then exit
    renolinkd --report /run/renogy/report.json --scan-interval 30

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging (overridden by --log-level)

FILES:
    ~/.config/renolink/config.json      Integration settings
    ~/.config/renolink/report.json      Default decoder report")]
pub struct Cli {
    /// Settings file (defaults to ~/.config/renolink/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Decoder report file
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// BLE address of the device (overrides settings)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Device type: controller, dcc, battery, inverter (overrides settings)
    #[arg(short = 't', long)]
    pub device_type: Option<String>,

    /// Refresh interval in seconds, 10-600 (overrides settings)
    #[arg(short = 'i', long)]
    pub scan_interval: Option<u64>,

    /// Log filter, e.g. "info" or "rl_core=debug"
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log to the systemd journal instead of stdout
    #[arg(long)]
    pub journald: bool,

    /// Run setup and a single update, then exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply_overrides(&self, config: &mut rl_core::IntegrationConfig) {
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(device_type) = &self.device_type {
            config.device_type = device_type.clone();
        }
        if let Some(secs) = self.scan_interval {
            config.scan_interval_secs = secs;
        }
    }
}

//! Integration settings
//!
//! Persistent settings stored as JSON in ~/.config/renolink/config.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::binding::BindingPolicy;
use crate::constants::{binding, paths, scan};
use crate::error::{RenolinkError, Result};
use rl_protocol::{DeviceTypeTag, RENOGY_BT_PREFIX, RENOGY_DEVICE_PREFIXES, UNKNOWN_NAME_PREFIX};

/// `AA:BB:CC:DD:EE:FF`
const ADDRESS_PATTERN: &str = r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$";

/// Settings for one configured device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// BLE address of the device, also its placeholder identity while unbound
    #[serde(default)]
    pub address: String,

    /// "controller", "dcc", "battery" or "inverter"
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// Collaborator refresh interval (10-600 s)
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    #[serde(default)]
    pub binding: BindingSettings,
}

/// Name-confirmation wait at setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Name prefixes that confirm a device
    #[serde(default = "default_name_prefixes")]
    pub name_prefixes: Vec<String>,

    /// Prefix of names the decoder gives unidentified devices
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,
}

fn default_device_type() -> String {
    DeviceTypeTag::default().as_str().to_string()
}
fn default_scan_interval() -> u64 {
    scan::DEFAULT_INTERVAL_SECS
}
fn default_max_attempts() -> u32 {
    binding::MAX_ATTEMPTS
}
fn default_interval_ms() -> u64 {
    binding::POLL_INTERVAL_MS
}
fn default_name_prefixes() -> Vec<String> {
    vec![RENOGY_BT_PREFIX.to_string()]
}
fn default_placeholder_prefix() -> String {
    UNKNOWN_NAME_PREFIX.to_string()
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            device_type: default_device_type(),
            scan_interval_secs: default_scan_interval(),
            binding: BindingSettings::default(),
        }
    }
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
            name_prefixes: default_name_prefixes(),
            placeholder_prefix: default_placeholder_prefix(),
        }
    }
}

impl IntegrationConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn binding_policy(&self) -> BindingPolicy {
        BindingPolicy {
            max_attempts: self.binding.max_attempts,
            interval: Duration::from_millis(self.binding.interval_ms),
            name_prefixes: self.binding.name_prefixes.clone(),
            placeholder_prefix: self.binding.placeholder_prefix.clone(),
        }
    }
}

/// Check every field, returning the first problem found.
///
/// An unknown device type is not an error: the taxonomy falls back to the
/// controller sensors and logs it. A name prefix outside the known Renogy
/// families is accepted with a warning.
pub fn validate_config(config: &IntegrationConfig) -> Result<()> {
    let re = regex::Regex::new(ADDRESS_PATTERN)
        .map_err(|e| RenolinkError::config(format!("Invalid address pattern: {}", e)))?;
    if !re.is_match(config.address.trim()) {
        return Err(RenolinkError::invalid_config(
            "address",
            format!("'{}' is not a BLE address (AA:BB:CC:DD:EE:FF)", config.address),
        ));
    }

    if !(scan::MIN_INTERVAL_SECS..=scan::MAX_INTERVAL_SECS).contains(&config.scan_interval_secs) {
        return Err(RenolinkError::invalid_config(
            "scan_interval_secs",
            format!(
                "{} is outside {}-{}",
                config.scan_interval_secs,
                scan::MIN_INTERVAL_SECS,
                scan::MAX_INTERVAL_SECS
            ),
        ));
    }

    if config.binding.max_attempts == 0 {
        return Err(RenolinkError::invalid_config(
            "binding.max_attempts",
            "must be at least 1",
        ));
    }
    if config.binding.interval_ms == 0 {
        return Err(RenolinkError::invalid_config(
            "binding.interval_ms",
            "must be greater than 0",
        ));
    }
    if config.binding.name_prefixes.iter().all(|p| p.is_empty()) {
        return Err(RenolinkError::invalid_config(
            "binding.name_prefixes",
            "needs at least one non-empty prefix",
        ));
    }
    for prefix in config.binding.name_prefixes.iter().filter(|p| !p.is_empty()) {
        if !is_known_family_prefix(prefix) {
            warn!(
                prefix = %prefix,
                known = ?RENOGY_DEVICE_PREFIXES,
                "Name prefix matches no known Renogy family"
            );
        }
    }

    Ok(())
}

/// Whether `prefix` overlaps one of the advertised family prefixes
fn is_known_family_prefix(prefix: &str) -> bool {
    RENOGY_DEVICE_PREFIXES
        .iter()
        .any(|family| prefix.starts_with(family) || family.starts_with(prefix))
}

/// Default settings path, creating the config directory if needed
pub fn get_config_path() -> Result<PathBuf> {
    let dir = paths::user_config_dir()
        .ok_or_else(|| RenolinkError::config("Could not determine config directory"))?;

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir.join(paths::CONFIG_FILE))
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<IntegrationConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(IntegrationConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| RenolinkError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: IntegrationConfig = serde_json::from_str(&content)?;
    debug!(path = %path.display(), address = %config.address, "Loaded config");
    Ok(config)
}

/// Save settings to `path` (temp file + rename)
pub fn save_config(path: &Path, config: &IntegrationConfig) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RenolinkError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let write_err = |e| RenolinkError::FileWrite {
        path: temp_path.clone(),
        source: e,
    };

    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(json.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| RenolinkError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), "Saved config");
    Ok(())
}

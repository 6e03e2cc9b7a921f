//! Constants and configuration values for Renolink
//!
//! Centralizes all magic numbers, unit strings, and configuration defaults.
//! Add new values here first instead of inlining them elsewhere.

use std::time::Duration;

/// Integration domain used in device registry identifiers
pub const DOMAIN: &str = "renogy";

/// Manufacturer reported in device info
pub const MANUFACTURER: &str = "Renogy";

/// Configuration paths
pub mod paths {
    use std::path::PathBuf;

    /// Settings file name inside the user config directory
    pub const CONFIG_FILE: &str = "config.json";

    /// User configuration directory (~/.config/renolink)
    pub fn user_config_dir() -> Option<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("renolink"));
        }
        dirs::config_dir().map(|p| p.join("renolink"))
    }

    /// Default settings file path
    pub fn default_config_path() -> Option<PathBuf> {
        user_config_dir().map(|p| p.join(CONFIG_FILE))
    }
}

/// Native units of measurement
pub mod units {
    pub const VOLT: &str = "V";
    pub const AMPERE: &str = "A";
    pub const PERCENT: &str = "%";
    pub const CELSIUS: &str = "°C";
    pub const WATT: &str = "W";
    pub const WATT_HOUR: &str = "Wh";
    pub const KILO_WATT_HOUR: &str = "kWh";
    pub const AMP_HOUR: &str = "Ah";
    pub const DAYS: &str = "days";
}

/// Value validation parameters
pub mod validation {
    /// Lowest accepted value for measured classes (inclusive)
    pub const MIN_PLAUSIBLE: f64 = -1000.0;

    /// Highest accepted value for measured classes (inclusive)
    pub const MAX_PLAUSIBLE: f64 = 10000.0;

    /// Lifetime energy is stored in Wh upstream and presented in kWh
    pub const WH_PER_KWH: f64 = 1000.0;
}

/// Binding resolver timing
pub mod binding {
    use super::*;

    /// Number of polls while waiting for a confirmed device name
    pub const MAX_ATTEMPTS: u32 = 10;

    /// Pause between polls
    pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

    /// Pause between polls in milliseconds (for settings)
    pub const POLL_INTERVAL_MS: u64 = 1000;
}

/// Collaborator refresh interval bounds
pub mod scan {
    pub const DEFAULT_INTERVAL_SECS: u64 = 60;
    pub const MIN_INTERVAL_SECS: u64 = 10;
    pub const MAX_INTERVAL_SECS: u64 = 600;
}

/// Entity labels
pub mod labels {
    /// Prefix of names given to entities without a bound device
    pub const GENERIC_NAME_PREFIX: &str = "Renogy";

    /// Prefix of the hardware version field in device info
    pub const HW_VERSION_PREFIX: &str = "BLE Address: ";
}

/// Extra state attribute names
pub mod attributes {
    pub const LAST_UPDATED: &str = "last_updated";
    pub const RSSI: &str = "rssi";
    pub const DATA_SOURCE: &str = "data_source";
}

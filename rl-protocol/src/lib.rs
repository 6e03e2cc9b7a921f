//! Shared boundary types for Renolink
//!
//! The discovery/decoding side produces `TelemetrySnapshot`s and `DeviceIdentity`s;
//! the sensor core consumes them. Key names in [`keys`] are the contract between
//! both sides. Any change to a key name must bump [`PROTOCOL_VERSION`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Version of the key namespace contract
pub const PROTOCOL_VERSION: u32 = 1;

/// Advertisement prefix of BT-1/BT-2 modules
pub const RENOGY_BT_PREFIX: &str = "BT-TH-";

/// All product-family advertisement prefixes (controllers, batteries, chargers)
pub const RENOGY_DEVICE_PREFIXES: &[&str] = &["BT-TH-", "RNGRBP", "BTRIC", "RBT"];

/// Prefix the decoder uses for devices it has not identified yet
pub const UNKNOWN_NAME_PREFIX: &str = "Unknown";

// ============================================================================
// Device Types
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTypeTag {
    #[default]
    Controller,
    Battery,
    Inverter,
    /// DC-DC charger (with or without MPPT)
    Dcc,
}

impl DeviceTypeTag {
    pub const ALL: [DeviceTypeTag; 4] = [
        DeviceTypeTag::Controller,
        DeviceTypeTag::Battery,
        DeviceTypeTag::Inverter,
        DeviceTypeTag::Dcc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTypeTag::Controller => "controller",
            DeviceTypeTag::Battery => "battery",
            DeviceTypeTag::Inverter => "inverter",
            DeviceTypeTag::Dcc => "dcc",
        }
    }
}

impl fmt::Display for DeviceTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceTypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "controller" => Ok(DeviceTypeTag::Controller),
            "battery" => Ok(DeviceTypeTag::Battery),
            "inverter" => Ok(DeviceTypeTag::Inverter),
            "dcc" => Ok(DeviceTypeTag::Dcc),
            other => Err(format!("unknown device type '{}'", other)),
        }
    }
}

// ============================================================================
// Telemetry Values
// ============================================================================

/// A single decoded reading as delivered by the decoder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

/// Latest decoded set of named readings, replaced wholesale on every refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TelemetrySnapshot(BTreeMap<String, ScalarValue>);

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ScalarValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScalarValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for TelemetrySnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Device Identity
// ============================================================================

fn default_available() -> bool {
    true
}

/// A physical device as discovered by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceIdentity {
    /// Stable BLE address
    pub address: String,
    /// Advertised name ("BT-TH-6B2F1C3A", or "Unknown Renogy" before identification)
    pub name: String,
    #[serde(rename = "available", default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub rssi: Option<i16>,
    /// Decoded readings of this device
    #[serde(rename = "data", default)]
    pub snapshot: TelemetrySnapshot,
}

impl DeviceIdentity {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            is_available: true,
            rssi: None,
            snapshot: TelemetrySnapshot::new(),
        }
    }

    pub fn with_snapshot(mut self, snapshot: TelemetrySnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.is_available = available;
        self
    }

    /// Model string reported by the device, if decoded yet
    pub fn model(&self) -> Option<String> {
        self.snapshot.get(keys::MODEL).map(|v| v.to_string())
    }
}

/// One refresh worth of collaborator state, as written by a decoder process
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceReport {
    /// Identified device, absent until discovery completes
    #[serde(default)]
    pub device: Option<DeviceIdentity>,
    /// Coordinator-level aggregate readings
    #[serde(default)]
    pub data: TelemetrySnapshot,
}

impl DeviceReport {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Key Namespace
// ============================================================================

/// Telemetry keys produced by the decoder
pub mod keys {
    // Controller: battery
    pub const BATTERY_VOLTAGE: &str = "battery_voltage";
    pub const BATTERY_CURRENT: &str = "battery_current";
    pub const BATTERY_PERCENTAGE: &str = "battery_percentage";
    pub const BATTERY_TEMPERATURE: &str = "battery_temperature";
    pub const BATTERY_TYPE: &str = "battery_type";
    pub const CHARGING_AMP_HOURS_TODAY: &str = "charging_amp_hours_today";
    pub const DISCHARGING_AMP_HOURS_TODAY: &str = "discharging_amp_hours_today";
    pub const CHARGING_STATUS: &str = "charging_status";

    // Controller: PV
    pub const PV_VOLTAGE: &str = "pv_voltage";
    pub const PV_CURRENT: &str = "pv_current";
    pub const PV_POWER: &str = "pv_power";
    pub const MAX_CHARGING_POWER_TODAY: &str = "max_charging_power_today";
    pub const POWER_GENERATION_TODAY: &str = "power_generation_today";
    /// Stored in Wh upstream
    pub const POWER_GENERATION_TOTAL: &str = "power_generation_total";

    // Controller: load
    pub const LOAD_VOLTAGE: &str = "load_voltage";
    pub const LOAD_CURRENT: &str = "load_current";
    pub const LOAD_POWER: &str = "load_power";
    pub const LOAD_STATUS: &str = "load_status";
    pub const POWER_CONSUMPTION_TODAY: &str = "power_consumption_today";

    // Controller: device
    pub const CONTROLLER_TEMPERATURE: &str = "controller_temperature";
    pub const DEVICE_ID: &str = "device_id";
    pub const MODEL: &str = "model";
    pub const MAX_DISCHARGING_POWER_TODAY: &str = "max_discharging_power_today";

    // DC-DC charger
    pub const BATTERY_SOC: &str = "battery_soc";
    pub const TOTAL_CHARGING_CURRENT: &str = "total_charging_current";
    pub const ALTERNATOR_VOLTAGE: &str = "alternator_voltage";
    pub const ALTERNATOR_CURRENT: &str = "alternator_current";
    pub const ALTERNATOR_POWER: &str = "alternator_power";
    pub const SOLAR_VOLTAGE: &str = "solar_voltage";
    pub const SOLAR_CURRENT: &str = "solar_current";
    pub const SOLAR_POWER: &str = "solar_power";
    pub const DAILY_MIN_BATTERY_VOLTAGE: &str = "daily_min_battery_voltage";
    pub const DAILY_MAX_BATTERY_VOLTAGE: &str = "daily_max_battery_voltage";
    pub const DAILY_MAX_CHARGING_CURRENT: &str = "daily_max_charging_current";
    pub const DAILY_MAX_CHARGING_POWER: &str = "daily_max_charging_power";
    pub const DAILY_CHARGING_AH: &str = "daily_charging_ah";
    pub const DAILY_POWER_GENERATION: &str = "daily_power_generation";
    pub const TOTAL_OPERATING_DAYS: &str = "total_operating_days";
    pub const TOTAL_OVERDISCHARGE_COUNT: &str = "total_overdischarge_count";
    pub const TOTAL_FULL_CHARGE_COUNT: &str = "total_full_charge_count";
    pub const TOTAL_CHARGING_AH: &str = "total_charging_ah";
    pub const TOTAL_POWER_GENERATION: &str = "total_power_generation";
    pub const CHARGING_MODE: &str = "charging_mode";
    pub const OUTPUT_POWER: &str = "output_power";
    pub const IGNITION_STATUS: &str = "ignition_status";
    pub const FAULT_HIGH: &str = "fault_high";
    pub const FAULT_LOW: &str = "fault_low";
    pub const SYSTEM_VOLTAGE: &str = "system_voltage";

    // LFP battery
    pub const VOLTAGE: &str = "voltage";
    pub const CURRENT: &str = "current";
    pub const SOC: &str = "soc";
    pub const POWER: &str = "power";
    pub const CAPACITY: &str = "capacity";
    pub const REMAINING_CHARGE: &str = "remaining_charge";
    pub const CELL_COUNT: &str = "cell_count";
    pub const SENSOR_COUNT: &str = "sensor_count";

    /// `cell_voltage_0` .. `cell_voltage_15`
    pub const CELL_VOLTAGE_PREFIX: &str = "cell_voltage_";
    /// `temperature_0` .. `temperature_15`
    pub const TEMPERATURE_PREFIX: &str = "temperature_";
    /// Indexed slots generated regardless of a pack's real cell/sensor count
    pub const INDEXED_SLOTS: usize = 16;

    pub fn indexed(prefix: &str, index: usize) -> String {
        format!("{}{}", prefix, index)
    }
}

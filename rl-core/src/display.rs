//! Display Formatting Helpers
//!
//! Host-agnostic rendering of readings for logs, CLIs and status pages.

use rl_protocol::ScalarValue;

use crate::constants::units;

/// Placeholder shown for a reading with no value
pub const UNAVAILABLE: &str = "unavailable";

/// Format a reading with its unit
///
/// # Arguments
/// * `value` - Resolved value, `None` when the reading has no value
/// * `unit` - Native unit of the sensor, if any
///
/// # Returns
/// Formatted string like "13.20 V", "87 %", "charging" or "unavailable"
pub fn format_reading(value: Option<&ScalarValue>, unit: Option<&str>) -> String {
    let value = match value {
        Some(value) => value,
        None => return UNAVAILABLE.to_string(),
    };

    let text = match value {
        ScalarValue::Float(v) => format!("{:.*}", precision(unit), v),
        other => other.to_string(),
    };

    match unit {
        Some(unit) if !unit.is_empty() => format!("{} {}", text, unit),
        _ => text,
    }
}

/// Decimal places for float readings in `unit`
fn precision(unit: Option<&str>) -> usize {
    match unit {
        Some(units::KILO_WATT_HOUR) => 3,
        Some(units::PERCENT) | Some(units::WATT) | Some(units::WATT_HOUR) => 0,
        Some(units::CELSIUS) => 1,
        _ => 2,
    }
}

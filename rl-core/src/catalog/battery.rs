//! LiFePO4 smart battery sensors
//!
//! Cell voltage and temperature sensors are generated for every slot up to
//! [`keys::INDEXED_SLOTS`], whatever the pack actually reports. Slots the pack
//! does not have simply resolve to no value.

use super::{categories, CategoryGroup};
use super::descriptor::{SemanticClass as C, SensorDescriptor as S};
use crate::constants::units;
use rl_protocol::keys;

pub(super) fn groups() -> Vec<CategoryGroup> {
    vec![
        CategoryGroup::new(categories::MAIN, pack()),
        CategoryGroup::new(categories::CELL_VOLTAGES, cell_voltage_descriptors()),
        CategoryGroup::new(categories::TEMPERATURES, temperature_descriptors()),
        CategoryGroup::new(categories::DIAGNOSTIC, diagnostic()),
    ]
}

fn pack() -> Vec<S> {
    let cat = categories::MAIN;
    vec![
        S::direct(cat, keys::VOLTAGE, "Battery Voltage", C::Voltage),
        S::direct(cat, keys::CURRENT, "Battery Current", C::Current),
        S::direct(cat, keys::SOC, "State of Charge", C::Percentage),
        S::direct(cat, keys::POWER, "Battery Power", C::Power),
        S::direct(cat, keys::CAPACITY, "Battery Capacity", C::None).with_unit(units::AMP_HOUR),
        S::direct(cat, keys::REMAINING_CHARGE, "Remaining Charge", C::None).with_unit(units::AMP_HOUR),
    ]
}

/// `cell_voltage_0` .. `cell_voltage_15`, labelled from 1
pub fn cell_voltage_descriptors() -> Vec<S> {
    (0..keys::INDEXED_SLOTS)
        .map(|i| {
            S::indexed(
                categories::CELL_VOLTAGES,
                keys::CELL_VOLTAGE_PREFIX,
                i,
                format!("Cell {} Voltage", i + 1),
                C::Voltage,
            )
        })
        .collect()
}

/// `temperature_0` .. `temperature_15`, labelled from 1
pub fn temperature_descriptors() -> Vec<S> {
    (0..keys::INDEXED_SLOTS)
        .map(|i| {
            S::indexed(
                categories::TEMPERATURES,
                keys::TEMPERATURE_PREFIX,
                i,
                format!("Temperature {}", i + 1),
                C::Temperature,
            )
        })
        .collect()
}

fn diagnostic() -> Vec<S> {
    let cat = categories::DIAGNOSTIC;
    vec![
        S::direct(cat, keys::DEVICE_ID, "Device ID", C::Text).diagnostic(),
        S::direct(cat, keys::MODEL, "Model", C::Text).diagnostic(),
        S::direct(cat, keys::CELL_COUNT, "Cell Count", C::Count).diagnostic(),
        S::direct(cat, keys::SENSOR_COUNT, "Temperature Sensor Count", C::Count).diagnostic(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_protocol::{ScalarValue, TelemetrySnapshot};

    #[test]
    fn test_cell_voltage_slots() {
        let cells = cell_voltage_descriptors();
        assert_eq!(cells.len(), 16);
        for (i, d) in cells.iter().enumerate() {
            assert_eq!(d.key, format!("cell_voltage_{}", i));
            assert_eq!(d.display_name, format!("Cell {} Voltage", i + 1));
        }
    }

    #[test]
    fn test_indexed_extractors_close_over_own_index() {
        for (i, d) in cell_voltage_descriptors().iter().enumerate() {
            let value = 3.0 + i as f64 / 100.0;
            let snapshot = TelemetrySnapshot::new().with(format!("cell_voltage_{}", i), value);
            assert_eq!(d.extractor.extract(&snapshot), Ok(Some(ScalarValue::Float(value))));

            // A neighbour's key must not leak into this slot
            let other = TelemetrySnapshot::new().with(format!("cell_voltage_{}", (i + 1) % 16), value);
            assert_eq!(d.extractor.extract(&other), Ok(None));
        }

        for (i, d) in temperature_descriptors().iter().enumerate() {
            let snapshot = TelemetrySnapshot::new().with(format!("temperature_{}", i), i as i64);
            assert_eq!(
                d.extractor.extract(&snapshot),
                Ok(Some(ScalarValue::Integer(i as i64)))
            );
        }
    }
}

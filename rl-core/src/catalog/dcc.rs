//! DC-DC charger sensors (DCC30S, DCC50S)

use super::{categories, CategoryGroup};
use super::descriptor::{SemanticClass as C, SensorDescriptor as S};
use crate::constants::units;
use rl_protocol::keys;

pub(super) fn groups() -> Vec<CategoryGroup> {
    vec![
        CategoryGroup::new(categories::BATTERY, battery()),
        CategoryGroup::new(categories::ALTERNATOR, alternator()),
        CategoryGroup::new(categories::SOLAR, solar()),
        CategoryGroup::new(categories::STATUS, status()),
        CategoryGroup::new(categories::STATISTICS, statistics()),
        CategoryGroup::new(categories::DIAGNOSTIC, diagnostic()),
    ]
}

fn battery() -> Vec<S> {
    let cat = categories::BATTERY;
    vec![
        S::direct(cat, keys::BATTERY_SOC, "House Battery SOC", C::Percentage),
        S::direct(cat, keys::BATTERY_VOLTAGE, "House Battery Voltage", C::Voltage),
        S::direct(cat, keys::TOTAL_CHARGING_CURRENT, "Total Charging Current", C::Current),
        S::direct(cat, keys::BATTERY_TYPE, "Battery Type", C::Text),
        S::direct(cat, keys::CONTROLLER_TEMPERATURE, "Controller Temperature", C::Temperature),
        S::direct(cat, keys::BATTERY_TEMPERATURE, "Battery Temperature", C::Temperature),
    ]
}

fn alternator() -> Vec<S> {
    let cat = categories::ALTERNATOR;
    vec![
        S::direct(cat, keys::ALTERNATOR_VOLTAGE, "Alternator Voltage", C::Voltage),
        S::direct(cat, keys::ALTERNATOR_CURRENT, "Alternator Current", C::Current),
        S::direct(cat, keys::ALTERNATOR_POWER, "Alternator Power", C::Power),
    ]
}

fn solar() -> Vec<S> {
    let cat = categories::SOLAR;
    vec![
        S::direct(cat, keys::SOLAR_VOLTAGE, "Solar Voltage", C::Voltage),
        S::direct(cat, keys::SOLAR_CURRENT, "Solar Current", C::Current),
        S::direct(cat, keys::SOLAR_POWER, "Solar Power", C::Power),
    ]
}

fn status() -> Vec<S> {
    let cat = categories::STATUS;
    vec![
        S::direct(cat, keys::CHARGING_STATUS, "Charging Status", C::Text),
        S::direct(cat, keys::CHARGING_MODE, "Charging Mode", C::Text),
        S::direct(cat, keys::OUTPUT_POWER, "Output Power", C::Power),
        S::direct(cat, keys::IGNITION_STATUS, "Ignition Status", C::Text),
    ]
}

fn statistics() -> Vec<S> {
    let cat = categories::STATISTICS;
    vec![
        S::direct(cat, keys::DAILY_MIN_BATTERY_VOLTAGE, "Daily Min Battery Voltage", C::Voltage),
        S::direct(cat, keys::DAILY_MAX_BATTERY_VOLTAGE, "Daily Max Battery Voltage", C::Voltage),
        S::direct(cat, keys::DAILY_MAX_CHARGING_CURRENT, "Daily Max Charging Current", C::Current),
        S::direct(cat, keys::DAILY_MAX_CHARGING_POWER, "Daily Max Charging Power", C::Power),
        S::direct(cat, keys::DAILY_CHARGING_AH, "Daily Charging Ah", C::None)
            .with_unit(units::AMP_HOUR)
            .monotonic(),
        S::direct(cat, keys::DAILY_POWER_GENERATION, "Daily Power Generation", C::Energy)
            .with_unit(units::KILO_WATT_HOUR)
            .monotonic(),
        S::direct(cat, keys::TOTAL_OPERATING_DAYS, "Total Operating Days", C::Count)
            .with_unit(units::DAYS)
            .monotonic(),
        S::direct(cat, keys::TOTAL_CHARGING_AH, "Total Charging Ah", C::None)
            .with_unit(units::AMP_HOUR)
            .monotonic(),
        S::direct(cat, keys::TOTAL_POWER_GENERATION, "Total Power Generation", C::Energy)
            .with_unit(units::KILO_WATT_HOUR)
            .monotonic(),
        S::direct(cat, keys::TOTAL_OVERDISCHARGE_COUNT, "Total Overdischarge Count", C::Count)
            .monotonic()
            .diagnostic(),
        S::direct(cat, keys::TOTAL_FULL_CHARGE_COUNT, "Total Full Charge Count", C::Count)
            .monotonic()
            .diagnostic(),
    ]
}

fn diagnostic() -> Vec<S> {
    let cat = categories::DIAGNOSTIC;
    vec![
        S::direct(cat, keys::DEVICE_ID, "Device ID", C::Text).diagnostic(),
        S::direct(cat, keys::MODEL, "Model", C::Text).diagnostic(),
        S::direct(cat, keys::SYSTEM_VOLTAGE, "System Voltage", C::Voltage).diagnostic(),
        S::direct(cat, keys::FAULT_HIGH, "Fault Code High", C::Text).diagnostic(),
        S::direct(cat, keys::FAULT_LOW, "Fault Code Low", C::Text).diagnostic(),
    ]
}

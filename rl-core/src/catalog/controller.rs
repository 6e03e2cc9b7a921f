//! Solar charge controller sensors (Rover, Wanderer, Adventurer)

use super::{categories, CategoryGroup};
use super::descriptor::{SemanticClass as C, SensorDescriptor as S};
use crate::constants::{units, validation};
use rl_protocol::keys;

pub(super) fn groups() -> Vec<CategoryGroup> {
    vec![
        CategoryGroup::new(categories::BATTERY, battery()),
        CategoryGroup::new(categories::PV, pv()),
        CategoryGroup::new(categories::LOAD, load()),
        CategoryGroup::new(categories::CONTROLLER, controller()),
    ]
}

fn battery() -> Vec<S> {
    let cat = categories::BATTERY;
    vec![
        S::direct(cat, keys::BATTERY_VOLTAGE, "Battery Voltage", C::Voltage),
        S::direct(cat, keys::BATTERY_CURRENT, "Battery Current", C::Current),
        S::direct(cat, keys::BATTERY_PERCENTAGE, "Battery Percentage", C::Percentage),
        S::direct(cat, keys::BATTERY_TEMPERATURE, "Battery Temperature", C::Temperature),
        S::direct(cat, keys::BATTERY_TYPE, "Battery Type", C::Text),
        S::direct(cat, keys::CHARGING_AMP_HOURS_TODAY, "Charging Amp Hours Today", C::None)
            .with_unit(units::AMP_HOUR)
            .monotonic(),
        S::direct(cat, keys::DISCHARGING_AMP_HOURS_TODAY, "Discharging Amp Hours Today", C::None)
            .with_unit(units::AMP_HOUR)
            .monotonic(),
        S::direct(cat, keys::CHARGING_STATUS, "Charging Status", C::Text),
    ]
}

fn pv() -> Vec<S> {
    let cat = categories::PV;
    vec![
        S::direct(cat, keys::PV_VOLTAGE, "PV Voltage", C::Voltage),
        S::direct(cat, keys::PV_CURRENT, "PV Current", C::Current),
        S::direct(cat, keys::PV_POWER, "PV Power", C::Power),
        S::direct(cat, keys::MAX_CHARGING_POWER_TODAY, "Max Charging Power Today", C::Power),
        S::direct(cat, keys::POWER_GENERATION_TODAY, "Power Generation Today", C::Energy).monotonic(),
        // Stored in Wh by the decoder
        S::direct(cat, keys::POWER_GENERATION_TOTAL, "Power Generation Total", C::Energy)
            .with_unit(units::KILO_WATT_HOUR)
            .monotonic()
            .scaled(validation::WH_PER_KWH),
    ]
}

fn load() -> Vec<S> {
    let cat = categories::LOAD;
    vec![
        S::direct(cat, keys::LOAD_VOLTAGE, "Load Voltage", C::Voltage),
        S::direct(cat, keys::LOAD_CURRENT, "Load Current", C::Current),
        S::direct(cat, keys::LOAD_POWER, "Load Power", C::Power),
        S::direct(cat, keys::LOAD_STATUS, "Load Status", C::Text),
        S::direct(cat, keys::POWER_CONSUMPTION_TODAY, "Power Consumption Today", C::Energy).monotonic(),
    ]
}

fn controller() -> Vec<S> {
    let cat = categories::CONTROLLER;
    vec![
        S::direct(cat, keys::CONTROLLER_TEMPERATURE, "Controller Temperature", C::Temperature),
        S::direct(cat, keys::DEVICE_ID, "Device ID", C::Text).diagnostic(),
        S::direct(cat, keys::MODEL, "Model", C::Text).diagnostic(),
        S::direct(cat, keys::MAX_DISCHARGING_POWER_TODAY, "Max Discharging Power Today", C::Power),
    ]
}

//! Sensor descriptor catalog
//!
//! Static tables of every sensor the integration knows, grouped by category for
//! each device family. Construction is deterministic and has no side effects;
//! [`crate::taxonomy`] builds these once and shares them for the process lifetime.

mod battery;
mod controller;
mod dcc;
pub mod descriptor;

pub use battery::{cell_voltage_descriptors, temperature_descriptors};
pub use descriptor::{
    AggregationPolicy, EntityCategory, Extractor, SemanticClass, SensorDescriptor,
};

use rl_protocol::DeviceTypeTag;
use serde::{Deserialize, Serialize};

/// Category labels used for display grouping
pub mod categories {
    pub const BATTERY: &str = "Battery";
    pub const PV: &str = "PV";
    pub const LOAD: &str = "Load";
    pub const CONTROLLER: &str = "Controller";
    pub const ALTERNATOR: &str = "Alternator";
    pub const SOLAR: &str = "Solar";
    pub const STATUS: &str = "Status";
    pub const STATISTICS: &str = "Statistics";
    pub const DIAGNOSTIC: &str = "Diagnostic";
    pub const MAIN: &str = "Main";
    pub const CELL_VOLTAGES: &str = "Cell Voltages";
    pub const TEMPERATURES: &str = "Temperatures";
}

/// Named, ordered list of descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub descriptors: Vec<SensorDescriptor>,
}

impl CategoryGroup {
    pub fn new(name: &str, descriptors: Vec<SensorDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            descriptors,
        }
    }
}

/// Category groups of a device family that has its own table.
///
/// Returns `None` for families without one (inverters).
pub fn groups_for(device_type: DeviceTypeTag) -> Option<Vec<CategoryGroup>> {
    match device_type {
        DeviceTypeTag::Controller => Some(controller::groups()),
        DeviceTypeTag::Dcc => Some(dcc::groups()),
        DeviceTypeTag::Battery => Some(battery::groups()),
        DeviceTypeTag::Inverter => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_protocol::TelemetrySnapshot;
    use std::collections::HashSet;

    fn defined_families() -> Vec<(DeviceTypeTag, Vec<CategoryGroup>)> {
        DeviceTypeTag::ALL
            .iter()
            .filter_map(|t| groups_for(*t).map(|g| (*t, g)))
            .collect()
    }

    #[test]
    fn test_defined_families() {
        assert_eq!(defined_families().len(), 3);
        assert!(groups_for(DeviceTypeTag::Inverter).is_none());
    }

    #[test]
    fn test_no_duplicate_keys_per_category() {
        for (tag, groups) in defined_families() {
            for group in &groups {
                let mut seen = HashSet::new();
                for d in &group.descriptors {
                    assert!(
                        seen.insert(d.key.as_str()),
                        "duplicate key {} in {}/{}",
                        d.key,
                        tag,
                        group.name
                    );
                    assert_eq!(d.category, group.name);
                }
            }
        }
    }

    #[test]
    fn test_empty_snapshot_extracts_nothing() {
        let empty = TelemetrySnapshot::new();
        for (_, groups) in defined_families() {
            for d in groups.iter().flat_map(|g| &g.descriptors) {
                assert_eq!(d.extractor.extract(&empty), Ok(None), "{}", d.key);
            }
        }
    }

    #[test]
    fn test_group_order() {
        let names: Vec<String> = groups_for(DeviceTypeTag::Dcc)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(
            names,
            ["Battery", "Alternator", "Solar", "Status", "Statistics", "Diagnostic"]
        );
    }

    #[test]
    fn test_lifetime_energy_is_scaled() {
        let groups = groups_for(DeviceTypeTag::Controller).unwrap();
        let total = groups
            .iter()
            .flat_map(|g| &g.descriptors)
            .find(|d| d.key == "power_generation_total")
            .unwrap();
        assert_eq!(total.unit.as_deref(), Some("kWh"));
        assert_eq!(total.aggregation_policy, AggregationPolicy::MonotonicIncreasing);
        assert!(matches!(total.extractor, Extractor::Scaled { divisor, .. } if divisor == 1000.0));
    }
}

//! Entity factory

use tracing::info;

use crate::entity::SensorEntity;
use crate::taxonomy;
use rl_protocol::DeviceIdentity;

/// One entity per descriptor of the resolved taxonomy, in category order.
///
/// Bound to `device` when given, otherwise unbound on `coordinator_address`.
pub fn build_entities(
    device_type: &str,
    coordinator_address: &str,
    device: Option<&DeviceIdentity>,
) -> Vec<SensorEntity> {
    let taxonomy = taxonomy::resolve(device_type);
    let entities: Vec<SensorEntity> = taxonomy
        .descriptors()
        .map(|d| SensorEntity::new(d, device_type, coordinator_address, device))
        .collect();

    match device {
        Some(device) => info!(
            count = entities.len(),
            family = %taxonomy.family(),
            device = %device.name,
            "Created entities for device"
        ),
        None => info!(
            count = entities.len(),
            family = %taxonomy.family(),
            address = coordinator_address,
            "Created entities with coordinator only"
        ),
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_one_entity_per_descriptor() {
        let entities = build_entities("battery", "AA:BB:CC:DD:EE:FF", None);
        assert_eq!(entities.len(), taxonomy::resolve("battery").len());

        let ids: HashSet<&str> = entities.iter().map(|e| e.unique_id()).collect();
        assert_eq!(ids.len(), entities.len());
    }

    #[test]
    fn test_category_metadata_follows_groups() {
        let entities = build_entities("dcc", "AA:BB:CC:DD:EE:FF", None);
        assert_eq!(entities.first().unwrap().category(), "Battery");
        assert_eq!(entities.last().unwrap().category(), "Diagnostic");
    }

    #[test]
    fn test_bound_build() {
        let device = DeviceIdentity::new("11:22:33:44:55:66", "BT-TH-6B2F");
        let entities = build_entities("controller", "AA:BB:CC:DD:EE:FF", Some(&device));
        assert!(entities.iter().all(|e| e.binding().is_bound()));
        assert!(entities[0].unique_id().starts_with("11:22:33:44:55:66_"));
    }

    #[test]
    fn test_unknown_type_builds_controller_set() {
        let unknown = build_entities("unknown-type", "AA:BB:CC:DD:EE:FF", None);
        let controller = build_entities("controller", "AA:BB:CC:DD:EE:FF", None);
        let a: Vec<&str> = unknown.iter().map(|e| e.unique_id()).collect();
        let b: Vec<&str> = controller.iter().map(|e| e.unique_id()).collect();
        assert_eq!(a, b);
        assert_eq!(unknown[0].device_info().name, "Renogy Unknown-type");
    }
}

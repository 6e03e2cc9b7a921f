//! Sensor entities
//!
//! One entity per descriptor. An entity starts either bound to a confirmed device
//! or unbound on the coordinator's address, and an unbound entity binds itself on
//! the first update notification that exposes a device. Binding never reverts.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::availability;
use crate::catalog::SensorDescriptor;
use crate::constants::{attributes, labels, DOMAIN, MANUFACTURER};
use crate::coordinator::Coordinator;
use crate::pipeline::{resolve_value, ActiveSnapshot, DataSource, ValueCache};
use rl_protocol::{DeviceIdentity, ScalarValue};

/// Capitalized device-type label ("controller" -> "Controller", "DCC" -> "Dcc")
pub fn device_type_label(device_type: &str) -> String {
    let mut chars = device_type.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// ============================================================================
// Binding and Device Info
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Binding {
    Unbound { placeholder_address: String },
    Bound { address: String, name: String },
}

impl Binding {
    /// Address the entity's identity is derived from
    pub fn address(&self) -> &str {
        match self {
            Binding::Unbound {
                placeholder_address,
            } => placeholder_address,
            Binding::Bound { address, .. } => address,
        }
    }

    pub fn bound_address(&self) -> Option<&str> {
        match self {
            Binding::Bound { address, .. } => Some(address),
            Binding::Unbound { .. } => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound { .. })
    }
}

/// Registry grouping for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub hw_version: String,
    pub sw_version: String,
}

impl DeviceInfo {
    fn new(address: &str, name: String, model: String, type_label: &str) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), address.to_string())],
            name,
            manufacturer: MANUFACTURER.to_string(),
            model,
            hw_version: format!("{}{}", labels::HW_VERSION_PREFIX, address),
            sw_version: type_label.to_string(),
        }
    }

    pub fn for_device(device: &DeviceIdentity, type_label: &str) -> Self {
        let model = device
            .model()
            .unwrap_or_else(|| generic_label(type_label));
        Self::new(&device.address, device.name.clone(), model, type_label)
    }

    pub fn generic(address: &str, type_label: &str) -> Self {
        Self::new(
            address,
            generic_label(type_label),
            generic_label(type_label),
            type_label,
        )
    }
}

fn generic_label(name: &str) -> String {
    format!("{} {}", labels::GENERIC_NAME_PREFIX, name)
}

// ============================================================================
// Entity
// ============================================================================

pub struct SensorEntity {
    descriptor: &'static SensorDescriptor,
    type_label: String,
    binding: Binding,
    unique_id: String,
    name: String,
    device_info: DeviceInfo,
    /// Update notifications received so far; keys the value cache
    updates: u64,
    cache: ValueCache,
    last_updated: Option<SystemTime>,
}

impl SensorEntity {
    /// Entity bound to `device`, or unbound on `coordinator_address`
    pub fn new(
        descriptor: &'static SensorDescriptor,
        device_type: &str,
        coordinator_address: &str,
        device: Option<&DeviceIdentity>,
    ) -> Self {
        let type_label = device_type_label(device_type);
        let (binding, name, device_info) = match device {
            Some(device) => (
                Binding::Bound {
                    address: device.address.clone(),
                    name: device.name.clone(),
                },
                format!("{} {}", device.name, descriptor.display_name),
                DeviceInfo::for_device(device, &type_label),
            ),
            None => (
                Binding::Unbound {
                    placeholder_address: coordinator_address.to_string(),
                },
                generic_label(&descriptor.display_name),
                DeviceInfo::generic(coordinator_address, &type_label),
            ),
        };
        let unique_id = format!("{}_{}", binding.address(), descriptor.key);

        Self {
            descriptor,
            type_label,
            binding,
            unique_id,
            name,
            device_info,
            updates: 0,
            cache: ValueCache::new(),
            last_updated: None,
        }
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    /// Display grouping label
    pub fn category(&self) -> &str {
        &self.descriptor.category
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// `{address}_{key}`, stable except for the single unbound -> bound transition
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn unit(&self) -> Option<&str> {
        self.descriptor.unit.as_deref()
    }

    /// Handle an update notification from the coordinator.
    ///
    /// Binds an unbound entity if a device is now exposed, invalidates the cached
    /// value and recomputes it.
    pub fn handle_update(&mut self, coordinator: &dyn Coordinator) {
        debug!(entity = %self.name, "Coordinator update");

        if !self.binding.is_bound() {
            if let Some(device) = coordinator.device() {
                self.bind(&device);
            }
        }

        self.updates += 1;
        self.last_updated = Some(SystemTime::now());
        self.native_value(coordinator);
    }

    fn bind(&mut self, device: &DeviceIdentity) {
        self.binding = Binding::Bound {
            address: device.address.clone(),
            name: device.name.clone(),
        };
        self.unique_id = format!("{}_{}", device.address, self.descriptor.key);
        self.name = format!("{} {}", device.name, self.descriptor.display_name);
        self.device_info = DeviceInfo::for_device(device, &self.type_label);
        debug!(entity = %self.unique_id, device = %device.name, "Bound to device");
    }

    pub fn data_source(&self, coordinator: &dyn Coordinator) -> DataSource {
        DataSource::current(self.binding.bound_address(), coordinator)
    }

    /// Current value, cached until the next update notification
    pub fn native_value(&self, coordinator: &dyn Coordinator) -> Option<ScalarValue> {
        self.cache.get_or_compute(self.updates, || {
            let source = self.data_source(coordinator);
            let active = ActiveSnapshot::select(&source, coordinator);
            resolve_value(self.descriptor, active.as_ref())
        })
    }

    pub fn is_available(&self, coordinator: &dyn Coordinator) -> bool {
        availability::is_available(&self.data_source(coordinator), coordinator)
    }

    /// `last_updated` (ms since epoch), `rssi` and `data_source`, each only when known
    pub fn extra_state_attributes(&self, coordinator: &dyn Coordinator) -> BTreeMap<String, Value> {
        let mut attrs = BTreeMap::new();

        if let Some(ms) = self
            .last_updated
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| u64::try_from(d.as_millis()).ok())
        {
            attrs.insert(attributes::LAST_UPDATED.to_string(), Value::from(ms));
        }

        let source = self.data_source(coordinator);
        if let Some(rssi) = source.device().and_then(|d| d.rssi) {
            attrs.insert(attributes::RSSI.to_string(), Value::from(rssi));
        }

        if let Some(active) = ActiveSnapshot::select(&source, coordinator) {
            attrs.insert(
                attributes::DATA_SOURCE.to_string(),
                Value::from(active.origin()),
            );
        }

        attrs
    }
}

impl std::fmt::Debug for SensorEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorEntity")
            .field("unique_id", &self.unique_id)
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("updates", &self.updates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::MemoryCoordinator;
    use crate::taxonomy;
    use rl_protocol::TelemetrySnapshot;

    const PLACEHOLDER: &str = "AA:BB:CC:DD:EE:FF";

    fn pv_voltage() -> &'static SensorDescriptor {
        taxonomy::resolve("controller")
            .descriptors()
            .find(|d| d.key == "pv_voltage")
            .unwrap()
    }

    #[test]
    fn test_type_label() {
        assert_eq!(device_type_label("controller"), "Controller");
        assert_eq!(device_type_label("DCC"), "Dcc");
        assert_eq!(device_type_label(""), "");
    }

    #[test]
    fn test_unbound_identity() {
        let entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, None);
        assert_eq!(entity.unique_id(), "AA:BB:CC:DD:EE:FF_pv_voltage");
        assert_eq!(entity.name(), "Renogy PV Voltage");
        assert_eq!(entity.device_info().name, "Renogy Controller");
        assert_eq!(entity.device_info().model, "Renogy Controller");
        assert_eq!(entity.device_info().hw_version, "BLE Address: AA:BB:CC:DD:EE:FF");
        assert_eq!(entity.category(), "PV");
    }

    #[test]
    fn test_bound_identity_uses_model() {
        let device = DeviceIdentity::new("11:22:33:44:55:66", "BT-TH-6B2F")
            .with_snapshot(TelemetrySnapshot::new().with("model", "RNG-CTRL-RVR40"));
        let entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, Some(&device));
        assert_eq!(entity.unique_id(), "11:22:33:44:55:66_pv_voltage");
        assert_eq!(entity.name(), "BT-TH-6B2F PV Voltage");
        assert_eq!(entity.device_info().model, "RNG-CTRL-RVR40");
        assert_eq!(entity.device_info().sw_version, "Controller");
        assert_eq!(
            entity.device_info().identifiers,
            vec![("renogy".to_string(), "11:22:33:44:55:66".to_string())]
        );
    }

    #[test]
    fn test_rebinds_once() {
        let coordinator = MemoryCoordinator::new(PLACEHOLDER);
        let mut entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, None);

        coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 18.5));
        entity.handle_update(&coordinator);
        assert_eq!(entity.unique_id(), "AA:BB:CC:DD:EE:FF_pv_voltage");

        coordinator.set_device(Some(DeviceIdentity::new("11:22:33:44:55:66", "BT-TH-6B2F")));
        coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 18.6));
        entity.handle_update(&coordinator);
        assert_eq!(entity.unique_id(), "11:22:33:44:55:66_pv_voltage");
        assert_eq!(entity.name(), "BT-TH-6B2F PV Voltage");

        coordinator.set_device(Some(DeviceIdentity::new("77:77:77:77:77:77", "BT-TH-OTHER")));
        coordinator.publish(TelemetrySnapshot::new());
        entity.handle_update(&coordinator);
        assert_eq!(entity.unique_id(), "11:22:33:44:55:66_pv_voltage");
    }

    #[test]
    fn test_value_is_cached_between_updates() {
        let coordinator = MemoryCoordinator::new(PLACEHOLDER);
        let mut entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, None);

        coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 18.5));
        entity.handle_update(&coordinator);
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(18.5)));

        // New data without a notification
        coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 19.0));
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(18.5)));
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(18.5)));

        entity.handle_update(&coordinator);
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(19.0)));
    }

    #[test]
    fn test_rebind_reads_device_snapshot() {
        let coordinator = MemoryCoordinator::new(PLACEHOLDER);
        let mut entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, None);

        coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 18.5));
        entity.handle_update(&coordinator);
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(18.5)));

        // Device exposed without new aggregate data
        let generation = coordinator.generation();
        coordinator.set_device(Some(
            DeviceIdentity::new("11:22:33:44:55:66", "BT-TH-1")
                .with_snapshot(TelemetrySnapshot::new().with("pv_voltage", 20.0)),
        ));
        assert_eq!(coordinator.generation(), generation);

        entity.handle_update(&coordinator);
        assert!(entity.binding().is_bound());
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(20.0)));
        assert_eq!(entity.extra_state_attributes(&coordinator)["data_source"], "device");
    }

    #[test]
    fn test_notification_invalidates_without_new_generation() {
        let coordinator = MemoryCoordinator::new(PLACEHOLDER);
        let device = DeviceIdentity::new(PLACEHOLDER, "BT-TH-1")
            .with_snapshot(TelemetrySnapshot::new().with("pv_voltage", 12.0));
        coordinator.set_device(Some(device.clone()));
        let mut entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, Some(&device));

        entity.handle_update(&coordinator);
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(12.0)));

        coordinator.set_device(Some(
            DeviceIdentity::new(PLACEHOLDER, "BT-TH-1")
                .with_snapshot(TelemetrySnapshot::new().with("pv_voltage", 12.5)),
        ));
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(12.0)));

        entity.handle_update(&coordinator);
        assert_eq!(entity.native_value(&coordinator), Some(ScalarValue::Float(12.5)));
    }

    #[test]
    fn test_extra_attributes() {
        let coordinator = MemoryCoordinator::new(PLACEHOLDER);
        let device = DeviceIdentity::new(PLACEHOLDER, "BT-TH-6B2F")
            .with_rssi(-67)
            .with_snapshot(TelemetrySnapshot::new().with("pv_voltage", 18.5));
        coordinator.set_device(Some(device.clone()));

        let mut entity = SensorEntity::new(pv_voltage(), "controller", PLACEHOLDER, Some(&device));
        assert!(entity.extra_state_attributes(&coordinator).get("last_updated").is_none());

        coordinator.publish(TelemetrySnapshot::new());
        entity.handle_update(&coordinator);
        let attrs = entity.extra_state_attributes(&coordinator);
        assert_eq!(attrs["rssi"], -67);
        assert_eq!(attrs["data_source"], "device");
        assert!(attrs["last_updated"].as_u64().unwrap() > 0);
    }
}

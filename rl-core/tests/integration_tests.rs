/*
 * Integration tests for Renolink
 *
 * These tests drive the core the way a host does: setup through the binding
 * resolver, then update notifications from an in-memory coordinator.
 */

use async_trait::async_trait;
use rl_core::{
    build_entities, setup_entities, taxonomy, BindingPhase, IntegrationConfig,
    MemoryCoordinator, SensorEntity, Sleeper,
};
use rl_protocol::{DeviceIdentity, DeviceReport, ScalarValue, TelemetrySnapshot};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ADDR: &str = "AA:BB:CC:DD:EE:FF";
const DEVICE_ADDR: &str = "C4:D3:6A:12:34:56";

// Test utilities
struct CountingSleeper(AtomicU32);

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn config(device_type: &str) -> IntegrationConfig {
    IntegrationConfig {
        address: ADDR.to_string(),
        device_type: device_type.to_string(),
        ..IntegrationConfig::default()
    }
}

fn entity<'a>(entities: &'a [SensorEntity], key: &str) -> &'a SensorEntity {
    entities
        .iter()
        .find(|e| e.descriptor().key == key)
        .unwrap_or_else(|| panic!("no entity for {}", key))
}

fn deliver(entities: &mut [SensorEntity], coordinator: &MemoryCoordinator) {
    for e in entities.iter_mut() {
        e.handle_update(coordinator);
    }
}

#[tokio::test]
async fn test_generic_setup_then_rebind() {
    let coordinator = MemoryCoordinator::new(ADDR);
    let sleeper = CountingSleeper(AtomicU32::new(0));

    let outcome = setup_entities(&config("controller"), &coordinator, &sleeper).await;
    assert_eq!(outcome.phase, BindingPhase::ResolvedGeneric);
    assert_eq!(sleeper.0.load(Ordering::SeqCst), 10);

    let mut entities = outcome.entities;
    assert_eq!(entity(&entities, "pv_voltage").unique_id(), format!("{}_pv_voltage", ADDR));
    assert_eq!(entity(&entities, "pv_voltage").name(), "Renogy PV Voltage");

    // Aggregate data only: readable but still unbound
    coordinator.publish(TelemetrySnapshot::new().with("pv_voltage", 18.7));
    deliver(&mut entities, &coordinator);
    let pv = entity(&entities, "pv_voltage");
    assert_eq!(pv.native_value(&coordinator), Some(ScalarValue::Float(18.7)));
    assert!(pv.is_available(&coordinator));
    assert!(!pv.binding().is_bound());

    // Discovery completes
    coordinator.apply_report(DeviceReport {
        device: Some(
            DeviceIdentity::new(DEVICE_ADDR, "BT-TH-6B2F1C3A")
                .with_rssi(-71)
                .with_snapshot(TelemetrySnapshot::new().with("pv_voltage", 19.1)),
        ),
        data: TelemetrySnapshot::new(),
    });
    deliver(&mut entities, &coordinator);
    let pv = entity(&entities, "pv_voltage");
    assert_eq!(pv.unique_id(), format!("{}_pv_voltage", DEVICE_ADDR));
    assert_eq!(pv.name(), "BT-TH-6B2F1C3A PV Voltage");
    assert_eq!(pv.native_value(&coordinator), Some(ScalarValue::Float(19.1)));
    assert_eq!(pv.extra_state_attributes(&coordinator)["data_source"], "device");

    // A later update must not move the identity again
    coordinator.publish(TelemetrySnapshot::new());
    deliver(&mut entities, &coordinator);
    assert_eq!(
        entity(&entities, "pv_voltage").unique_id(),
        format!("{}_pv_voltage", DEVICE_ADDR)
    );
}

#[tokio::test]
async fn test_device_appears_during_wait() {
    let coordinator = Arc::new(MemoryCoordinator::new(ADDR));

    struct RevealOnSecond {
        coordinator: Arc<MemoryCoordinator>,
        waits: AtomicU32,
    }

    #[async_trait]
    impl Sleeper for RevealOnSecond {
        async fn sleep(&self, _duration: Duration) {
            if self.waits.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                self.coordinator
                    .set_device(Some(DeviceIdentity::new(DEVICE_ADDR, "BT-TH-0001")));
            }
        }
    }

    let sleeper = RevealOnSecond {
        coordinator: Arc::clone(&coordinator),
        waits: AtomicU32::new(0),
    };
    let outcome = setup_entities(&config("dcc"), coordinator.as_ref(), &sleeper).await;

    assert_eq!(sleeper.waits.load(Ordering::SeqCst), 2);
    assert!(outcome.entities.iter().all(|e| e.binding().is_bound()));
    assert_eq!(outcome.entities[0].device_info().sw_version, "Dcc");
}

#[test]
fn test_battery_cells_resolve_by_index() {
    let coordinator = MemoryCoordinator::new(ADDR);
    let mut entities = build_entities("battery", ADDR, None);

    let snapshot: TelemetrySnapshot = (0..4)
        .map(|i| (format!("cell_voltage_{}", i), 3.30 + f64::from(i) * 0.01))
        .collect();
    coordinator.publish(snapshot.with("temperature_0", 21i64));
    deliver(&mut entities, &coordinator);

    assert_eq!(
        entity(&entities, "cell_voltage_2").native_value(&coordinator),
        Some(ScalarValue::Float(3.30 + 2.0 * 0.01))
    );
    assert_eq!(entity(&entities, "cell_voltage_4").native_value(&coordinator), None);
    assert_eq!(entity(&entities, "cell_voltage_15").native_value(&coordinator), None);
    assert_eq!(
        entity(&entities, "temperature_0").native_value(&coordinator),
        Some(ScalarValue::Float(21.0))
    );
    assert_eq!(entity(&entities, "cell_voltage_15").name(), "Renogy Cell 16 Voltage");
}

#[test]
fn test_lifetime_energy_in_kwh() {
    let coordinator = MemoryCoordinator::new(ADDR);
    let mut entities = build_entities("controller", ADDR, None);

    coordinator.publish(TelemetrySnapshot::new().with("power_generation_total", 250_500i64));
    deliver(&mut entities, &coordinator);

    let total = entity(&entities, "power_generation_total");
    assert_eq!(total.native_value(&coordinator), Some(ScalarValue::Float(250.5)));
    assert_eq!(total.unit(), Some("kWh"));
}

#[test]
fn test_implausible_values_become_null() {
    let coordinator = MemoryCoordinator::new(ADDR);
    let mut entities = build_entities("controller", ADDR, None);

    coordinator.publish(
        TelemetrySnapshot::new()
            .with("battery_voltage", 10001i64)
            .with("battery_current", "garbage")
            .with("pv_power", 10000i64)
            .with("charging_status", "mppt"),
    );
    deliver(&mut entities, &coordinator);

    assert_eq!(entity(&entities, "battery_voltage").native_value(&coordinator), None);
    assert_eq!(entity(&entities, "battery_current").native_value(&coordinator), None);
    assert_eq!(
        entity(&entities, "pv_power").native_value(&coordinator),
        Some(ScalarValue::Float(10000.0))
    );
    assert_eq!(
        entity(&entities, "charging_status").native_value(&coordinator),
        Some(ScalarValue::Text("mppt".to_string()))
    );
    // Rejected readings do not make the entity unavailable
    assert!(entity(&entities, "battery_voltage").is_available(&coordinator));
}

#[test]
fn test_failed_refresh_keeps_cached_value() {
    let coordinator = MemoryCoordinator::new(ADDR);
    let mut entities = build_entities("controller", ADDR, None);

    coordinator.publish(TelemetrySnapshot::new().with("load_power", 42i64));
    deliver(&mut entities, &coordinator);

    coordinator.mark_failed();
    deliver(&mut entities, &coordinator);

    let load = entity(&entities, "load_power");
    assert!(!load.is_available(&coordinator));
    assert_eq!(load.native_value(&coordinator), Some(ScalarValue::Float(42.0)));
}

#[test]
fn test_every_reading_empty_without_data() {
    let coordinator = MemoryCoordinator::new(ADDR);
    for device_type in ["controller", "dcc", "battery", "inverter"] {
        let mut entities = build_entities(device_type, ADDR, None);
        assert_eq!(entities.len(), taxonomy::resolve(device_type).len());
        deliver(&mut entities, &coordinator);
        for e in &entities {
            assert_eq!(e.native_value(&coordinator), None);
            assert!(!e.is_available(&coordinator));
        }
    }
}

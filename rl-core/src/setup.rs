//! Setup orchestration: binding resolution followed by entity creation

use tracing::{debug, info, warn};

use crate::binding::{BindingPhase, BindingResolver, Sleeper};
use crate::coordinator::Coordinator;
use crate::entity::SensorEntity;
use crate::factory::build_entities;
use crate::settings::IntegrationConfig;

/// Entities created at setup, with the binding decision that shaped them
#[derive(Debug)]
pub struct SetupOutcome {
    pub phase: BindingPhase,
    pub entities: Vec<SensorEntity>,
}

/// Resolve the device binding and build every entity for the configured type
pub async fn setup_entities(
    config: &IntegrationConfig,
    coordinator: &dyn Coordinator,
    sleeper: &dyn Sleeper,
) -> SetupOutcome {
    debug!(
        address = %coordinator.address(),
        device_type = %config.device_type,
        "Setting up sensors"
    );

    let resolver = BindingResolver::new(config.binding_policy());
    let phase = resolver.resolve(coordinator, sleeper).await;

    let entities = match phase.device() {
        Some(device) => {
            info!(device = %device.name, "Creating entities with device name");
            build_entities(&config.device_type, &coordinator.address(), Some(device.as_ref()))
        }
        None => {
            info!("Creating entities with coordinator only (generic name)");
            build_entities(&config.device_type, &coordinator.address(), None)
        }
    };

    if entities.is_empty() {
        warn!("No entities were created");
    } else {
        debug!(count = entities.len(), "Adding entities");
    }

    SetupOutcome { phase, entities }
}

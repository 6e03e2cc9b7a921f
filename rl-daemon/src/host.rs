//! Presentation-layer stand-in
//!
//! Owns the entities created at setup, delivers update notifications to them
//! serially and logs the resulting readings.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use rl_core::{format_reading, Coordinator, SensorEntity};

use crate::collaborator::FileCoordinator;

pub struct Host {
    coordinator: Arc<FileCoordinator>,
    entities: Vec<SensorEntity>,
}

impl Host {
    pub fn new(coordinator: Arc<FileCoordinator>, entities: Vec<SensorEntity>) -> Self {
        Self {
            coordinator,
            entities,
        }
    }

    pub fn entities(&self) -> &[SensorEntity] {
        &self.entities
    }

    /// Deliver one update notification to every entity
    pub fn notify(&mut self) {
        let coordinator: &dyn Coordinator = self.coordinator.as_ref();
        for entity in &mut self.entities {
            entity.handle_update(coordinator);
        }
        debug!(
            entities = self.entities.len(),
            generation = coordinator.generation(),
            "Update delivered"
        );
    }

    pub fn log_readings(&self) {
        let coordinator: &dyn Coordinator = self.coordinator.as_ref();
        for entity in &self.entities {
            let value = entity.native_value(coordinator);
            info!(
                entity = %entity.unique_id(),
                category = entity.category(),
                value = %format_reading(value.as_ref(), entity.unit()),
                available = entity.is_available(coordinator),
                "{}",
                entity.name()
            );
        }
    }

    /// Refresh, notify and log every `interval` until Ctrl-C
    pub async fn run(mut self, interval: Duration) {
        info!(interval_secs = interval.as_secs(), "Update loop started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    // A failed refresh still notifies, entities report unavailable
                    let _ = self.coordinator.refresh();
                    self.notify();
                    self.log_readings();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, shutting down");
                    break;
                }
            }
        }
    }
}

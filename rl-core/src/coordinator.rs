//! Collaborator boundary
//!
//! The discovery/decoding side is abstracted as a [`Coordinator`]: it owns the
//! device identity and the aggregate snapshot, reports whether its last refresh
//! worked, and counts update generations. Entities only ever read from it.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use rl_protocol::{DeviceIdentity, DeviceReport, TelemetrySnapshot};

/// Read side of the discovery/decoding collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Configured BLE address, used as placeholder identity while unbound
    fn address(&self) -> String;

    /// Identified device, if discovery has produced one
    fn device(&self) -> Option<Arc<DeviceIdentity>>;

    /// Coordinator-level aggregate readings
    fn data(&self) -> Option<Arc<TelemetrySnapshot>>;

    fn last_update_success(&self) -> bool;

    /// Monotonic counter bumped on every successful update
    fn generation(&self) -> u64;

    /// Ask for an immediate refresh and wait for it to finish
    async fn request_refresh(&self);
}

#[derive(Debug)]
struct State {
    device: Option<Arc<DeviceIdentity>>,
    data: Option<Arc<TelemetrySnapshot>>,
    last_update_success: bool,
}

/// In-process collaborator fed by whoever decodes the telemetry
#[derive(Debug)]
pub struct MemoryCoordinator {
    address: String,
    state: RwLock<State>,
    generation: AtomicU64,
    refresh_requests: AtomicU32,
}

impl MemoryCoordinator {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            state: RwLock::new(State {
                device: None,
                data: None,
                last_update_success: true,
            }),
            generation: AtomicU64::new(0),
            refresh_requests: AtomicU32::new(0),
        }
    }

    /// Replace the aggregate snapshot and start a new generation
    pub fn publish(&self, data: TelemetrySnapshot) -> u64 {
        {
            let mut state = self.state.write();
            state.data = Some(Arc::new(data));
            state.last_update_success = true;
        }
        self.bump()
    }

    /// Expose (or withdraw) the discovered device without starting a generation
    pub fn set_device(&self, device: Option<DeviceIdentity>) {
        self.state.write().device = device.map(Arc::new);
    }

    /// Apply a complete report as one successful update
    pub fn apply_report(&self, report: DeviceReport) -> u64 {
        {
            let mut state = self.state.write();
            if let Some(device) = report.device {
                state.device = Some(Arc::new(device));
            }
            state.data = Some(Arc::new(report.data));
            state.last_update_success = true;
        }
        self.bump()
    }

    /// Record a failed refresh. Cached values stay valid until the next update.
    pub fn mark_failed(&self) {
        self.state.write().last_update_success = false;
        debug!(address = %self.address, "Refresh marked as failed");
    }

    /// Number of refresh requests received so far
    pub fn refresh_requests(&self) -> u32 {
        self.refresh_requests.load(Ordering::SeqCst)
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Coordinator for MemoryCoordinator {
    fn address(&self) -> String {
        self.address.clone()
    }

    fn device(&self) -> Option<Arc<DeviceIdentity>> {
        self.state.read().device.clone()
    }

    fn data(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.state.read().data.clone()
    }

    fn last_update_success(&self) -> bool {
        self.state.read().last_update_success
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn request_refresh(&self) {
        let n = self.refresh_requests.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(address = %self.address, requests = n, "Refresh requested");
    }
}

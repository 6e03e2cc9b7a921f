//! File-backed collaborator
//!
//! The BLE decoder runs as its own process and writes one JSON `DeviceReport`
//! per refresh. Each refresh here re-reads that file into a `MemoryCoordinator`.
//! A missing or unparsable report counts as a failed refresh: entities turn
//! unavailable and keep their cached values.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use rl_core::{Coordinator, MemoryCoordinator};
use rl_error::{RenolinkError, Result};
use rl_protocol::{DeviceIdentity, DeviceReport, TelemetrySnapshot};

pub struct FileCoordinator {
    inner: MemoryCoordinator,
    report_path: PathBuf,
}

impl FileCoordinator {
    pub fn new(address: impl Into<String>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: MemoryCoordinator::new(address),
            report_path: report_path.into(),
        }
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Re-read the report. Returns the new generation on success.
    pub fn refresh(&self) -> Result<u64> {
        match read_report(&self.report_path) {
            Ok(report) => {
                let device = report.device.as_ref().map(|d| d.name.clone());
                let generation = self.inner.apply_report(report);
                debug!(generation, device = ?device, "Report applied");
                Ok(generation)
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                self.inner.mark_failed();
                Err(e)
            }
        }
    }
}

fn read_report(path: &Path) -> Result<DeviceReport> {
    let content = fs::read_to_string(path)
        .map_err(|e| RenolinkError::report_unavailable(path, e.to_string()))?;
    DeviceReport::from_json(&content)
        .map_err(|e| RenolinkError::report_unavailable(path, e.to_string()))
}

#[async_trait]
impl Coordinator for FileCoordinator {
    fn address(&self) -> String {
        self.inner.address()
    }

    fn device(&self) -> Option<Arc<DeviceIdentity>> {
        self.inner.device()
    }

    fn data(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.inner.data()
    }

    fn last_update_success(&self) -> bool {
        self.inner.last_update_success()
    }

    fn generation(&self) -> u64 {
        self.inner.generation()
    }

    async fn request_refresh(&self) {
        self.inner.request_refresh().await;
        // Failure is already recorded and logged
        let _ = self.refresh();
    }
}

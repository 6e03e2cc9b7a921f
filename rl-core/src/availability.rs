//! Availability evaluation

use crate::coordinator::Coordinator;
use crate::pipeline::{ActiveSnapshot, DataSource};

/// Whether an entity reading from `source` should be considered live.
///
/// A failed refresh or a device reporting itself unavailable wins over any data
/// still around. Otherwise some snapshot must be non-empty.
pub fn is_available(source: &DataSource, coordinator: &dyn Coordinator) -> bool {
    if !coordinator.last_update_success() {
        return false;
    }
    if let DataSource::Bound(device) = source {
        if !device.is_available {
            return false;
        }
    }
    ActiveSnapshot::select(source, coordinator).is_some()
}

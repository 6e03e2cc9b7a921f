//! Value resolution and validation pipeline
//!
//! Turns the raw reading behind a descriptor into a safe value:
//!
//! 1. Pick the active snapshot (bound device first, coordinator aggregate second)
//! 2. Run the descriptor's extractor
//! 3. Coerce measured classes to `f64` and range-check them
//!
//! Every failure degrades to `None`. Rejections are logged at warn level, missing
//! data is silent. Results are cached per update notification by [`ValueCache`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::catalog::SensorDescriptor;
use crate::constants::validation::{MAX_PLAUSIBLE, MIN_PLAUSIBLE};
use crate::coordinator::Coordinator;
use crate::error::ReadingError;
use rl_protocol::{DeviceIdentity, ScalarValue, TelemetrySnapshot};

// ============================================================================
// Data Sources
// ============================================================================

/// Where an entity reads from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Live identity of the device the entity is bound to
    Bound(Arc<DeviceIdentity>),
    /// No device yet; only the coordinator's aggregate data is available
    Unbound(String),
}

impl DataSource {
    /// Data source for an entity bound to `bound_address` (or unbound when `None`).
    ///
    /// A bound entity whose device the coordinator no longer exposes reads the
    /// aggregate data like an unbound one.
    pub fn current(bound_address: Option<&str>, coordinator: &dyn Coordinator) -> Self {
        if let Some(address) = bound_address {
            if let Some(device) = coordinator.device() {
                if device.address == address {
                    return DataSource::Bound(device);
                }
            }
        }
        DataSource::Unbound(coordinator.address())
    }

    pub fn device(&self) -> Option<&Arc<DeviceIdentity>> {
        match self {
            DataSource::Bound(device) => Some(device),
            DataSource::Unbound(_) => None,
        }
    }
}

/// Snapshot chosen for a read, remembering where it came from
#[derive(Debug, Clone)]
pub enum ActiveSnapshot {
    Device(Arc<DeviceIdentity>),
    Coordinator(Arc<TelemetrySnapshot>),
}

impl ActiveSnapshot {
    /// Bound device's snapshot if non-empty, else the coordinator aggregate if non-empty
    pub fn select(source: &DataSource, coordinator: &dyn Coordinator) -> Option<Self> {
        if let DataSource::Bound(device) = source {
            if !device.snapshot.is_empty() {
                return Some(ActiveSnapshot::Device(Arc::clone(device)));
            }
        }
        coordinator
            .data()
            .filter(|data| !data.is_empty())
            .map(ActiveSnapshot::Coordinator)
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        match self {
            ActiveSnapshot::Device(device) => &device.snapshot,
            ActiveSnapshot::Coordinator(data) => data,
        }
    }

    /// Value of the `data_source` attribute
    pub fn origin(&self) -> &'static str {
        match self {
            ActiveSnapshot::Device(_) => "device",
            ActiveSnapshot::Coordinator(_) => "coordinator",
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Coerce a raw reading to `f64`
pub fn coerce_numeric(key: &str, raw: &ScalarValue) -> Result<f64, ReadingError> {
    let not_numeric = || ReadingError::NotNumeric {
        key: key.to_string(),
        value: raw.to_string(),
    };
    match raw {
        ScalarValue::Float(v) => Ok(*v),
        ScalarValue::Integer(i) => Ok(*i as f64),
        ScalarValue::Bool(b) => Ok(f64::from(u8::from(*b))),
        ScalarValue::Text(s) => s.trim().parse::<f64>().map_err(|_| not_numeric()),
    }
}

/// Plausibility check, bounds inclusive. NaN is rejected.
pub fn check_range(key: &str, value: f64) -> Result<f64, ReadingError> {
    if (MIN_PLAUSIBLE..=MAX_PLAUSIBLE).contains(&value) {
        Ok(value)
    } else {
        Err(ReadingError::OutOfRange {
            key: key.to_string(),
            value,
            min: MIN_PLAUSIBLE,
            max: MAX_PLAUSIBLE,
        })
    }
}

/// Coercion and range check for measured classes
pub fn validate_measurement(key: &str, raw: &ScalarValue) -> Result<f64, ReadingError> {
    coerce_numeric(key, raw).and_then(|v| check_range(key, v))
}

/// Extract and validate a reading without touching any cache.
///
/// Never fails: rejections are logged and become `None`.
pub fn resolve_value(
    descriptor: &SensorDescriptor,
    active: Option<&ActiveSnapshot>,
) -> Option<ScalarValue> {
    let snapshot = active?.snapshot();

    let raw = match descriptor.extractor.extract(snapshot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(sensor = %descriptor.display_name, key = e.key(), error = %e, "Rejected reading");
            return None;
        }
    };

    if !descriptor.is_measured() {
        return Some(raw);
    }

    match validate_measurement(&descriptor.key, &raw) {
        Ok(value) => Some(ScalarValue::Float(value)),
        Err(e) => {
            warn!(sensor = %descriptor.display_name, key = e.key(), error = %e, "Rejected reading");
            None
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Resolved value tagged with the update it was computed for
#[derive(Debug, Clone)]
struct CachedReading {
    value: Option<ScalarValue>,
    generation: u64,
}

/// Per-entity value cache; an entry is valid only for its own update generation
#[derive(Debug, Default)]
pub struct ValueCache {
    slot: Mutex<Option<CachedReading>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `generation`, computing and storing it on a miss.
    /// `None` results are cached too.
    pub fn get_or_compute<F>(&self, generation: u64, compute: F) -> Option<ScalarValue>
    where
        F: FnOnce() -> Option<ScalarValue>,
    {
        let mut slot = self.slot.lock();
        if let Some(cached) = slot.as_ref() {
            if cached.generation == generation {
                return cached.value.clone();
            }
        }
        let value = compute();
        *slot = Some(CachedReading {
            value: value.clone(),
            generation,
        });
        value
    }
}

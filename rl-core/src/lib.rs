//! Renolink Core Library
//!
//! Turns telemetry decoded from Renogy BLE devices into a stable set of typed,
//! unit-annotated, validated sensor readings.
//!
//! # Features
//!
//! - **Descriptor Catalog**: Every sensor of controllers, DC-DC chargers and LFP batteries
//! - **Taxonomy**: Category grouping per device type with a controller fallback
//! - **Binding**: Bounded wait for a confirmed device name, then late rebinding
//! - **Value Pipeline**: Extraction, coercion, plausibility checks and per-update caching
//! - **Availability**: Refresh, device and data checks
//!
//! # Module Structure
//!
//! - `catalog/` - Sensor descriptors and the static tables
//! - `taxonomy`, `factory`, `entity` - Entity construction and state
//! - `binding`, `pipeline`, `availability` - Runtime behaviour
//! - `coordinator` - Collaborator boundary
//!
//! # Example
//!
//! ```no_run
//! use rl_core::{build_entities, MemoryCoordinator};
//! use rl_protocol::TelemetrySnapshot;
//!
//! let coordinator = MemoryCoordinator::new("AA:BB:CC:DD:EE:FF");
//! let mut entities = build_entities("controller", "AA:BB:CC:DD:EE:FF", None);
//!
//! coordinator.publish(TelemetrySnapshot::new().with("battery_voltage", 13.2));
//! for entity in &mut entities {
//!     entity.handle_update(&coordinator);
//! }
//! ```

// Grouped modules
pub mod catalog;

// Standalone modules
pub mod availability;
pub mod binding;
pub mod constants;
pub mod coordinator;
pub mod display;
pub mod entity;
pub mod error;
pub mod factory;
pub mod pipeline;
pub mod settings;
pub mod setup;
pub mod taxonomy;

#[cfg(test)]
mod test_utils;

// Re-export catalog types
pub use catalog::{
    AggregationPolicy, CategoryGroup, EntityCategory, Extractor, SemanticClass,
    SensorDescriptor,
};

// Re-export error types
pub use error::{ReadingError, RenolinkError, Result};

// Re-export runtime types
pub use availability::is_available;
pub use binding::{BindingPhase, BindingPolicy, BindingResolver, Sleeper, TokioSleeper};
pub use coordinator::{Coordinator, MemoryCoordinator};
pub use entity::{Binding, DeviceInfo, SensorEntity};
pub use factory::build_entities;
pub use pipeline::{resolve_value, ActiveSnapshot, DataSource, ValueCache};
pub use taxonomy::Taxonomy;

// Re-export settings functions
pub use settings::{
    get_config_path, load_config, save_config, validate_config, BindingSettings,
    IntegrationConfig,
};

// Re-export setup
pub use setup::{setup_entities, SetupOutcome};

// Re-export display helpers
pub use display::format_reading;

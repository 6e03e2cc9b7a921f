//! Sensor descriptor model
//!
//! A descriptor is the immutable definition of one sensor: its key, label, unit,
//! semantic class and the rule that pulls its raw value out of a telemetry snapshot.
//! Extraction rules are plain data so the whole catalog can be serialized and
//! inspected without running any code.

use serde::{Deserialize, Serialize};

use crate::constants::units;
use crate::error::ReadingError;
use rl_protocol::{ScalarValue, TelemetrySnapshot};

/// Physical quantity kind, selects coercion, plausibility checks and default unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticClass {
    Voltage,
    Current,
    Temperature,
    Power,
    Energy,
    Percentage,
    Count,
    Text,
    None,
}

impl SemanticClass {
    /// Classes whose values are coerced to f64 and range-checked
    pub fn is_measured(&self) -> bool {
        matches!(
            self,
            SemanticClass::Voltage
                | SemanticClass::Current
                | SemanticClass::Temperature
                | SemanticClass::Power
        )
    }

    pub fn default_unit(&self) -> Option<&'static str> {
        match self {
            SemanticClass::Voltage => Some(units::VOLT),
            SemanticClass::Current => Some(units::AMPERE),
            SemanticClass::Temperature => Some(units::CELSIUS),
            SemanticClass::Power => Some(units::WATT),
            SemanticClass::Energy => Some(units::WATT_HOUR),
            SemanticClass::Percentage => Some(units::PERCENT),
            SemanticClass::Count | SemanticClass::Text | SemanticClass::None => None,
        }
    }
}

/// How the presentation layer should treat resets and accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    Instantaneous,
    MonotonicIncreasing,
}

/// Registry category for entities that are not primary readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// Extraction strategy: which snapshot key to read and how to transform it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Extractor {
    /// Read `key` as-is
    Direct { key: String },
    /// Read `{prefix}{index}`
    Indexed { prefix: String, index: usize },
    /// Read `key` and divide the numeric value by `divisor`
    Scaled { key: String, divisor: f64 },
}

impl Extractor {
    /// Snapshot key this extractor reads
    pub fn source_key(&self) -> String {
        match self {
            Extractor::Direct { key } | Extractor::Scaled { key, .. } => key.clone(),
            Extractor::Indexed { prefix, index } => rl_protocol::keys::indexed(prefix, *index),
        }
    }

    /// Pull the raw value out of a snapshot.
    ///
    /// `Ok(None)` means the key is absent, which is never an error.
    pub fn extract(
        &self,
        snapshot: &TelemetrySnapshot,
    ) -> Result<Option<ScalarValue>, ReadingError> {
        match self {
            Extractor::Direct { key } => Ok(snapshot.get(key).cloned()),
            Extractor::Indexed { .. } => Ok(snapshot.get(&self.source_key()).cloned()),
            Extractor::Scaled { key, divisor } => {
                let raw = match snapshot.get(key) {
                    Some(raw) => raw,
                    None => return Ok(None),
                };
                let numeric = match raw {
                    ScalarValue::Integer(i) => *i as f64,
                    ScalarValue::Float(v) => *v,
                    ScalarValue::Bool(b) => f64::from(u8::from(*b)),
                    ScalarValue::Text(s) => {
                        return Err(ReadingError::NotScalable {
                            key: key.clone(),
                            value: s.clone(),
                        })
                    }
                };
                Ok(Some(ScalarValue::Float(numeric / divisor)))
            }
        }
    }
}

/// Immutable definition of one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    /// Unique within (device type, category)
    pub key: String,
    pub display_name: String,
    pub unit: Option<String>,
    pub semantic_class: SemanticClass,
    pub aggregation_policy: AggregationPolicy,
    /// Display grouping label ("Battery", "Alternator", "Diagnostic", ...)
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<EntityCategory>,
    pub extractor: Extractor,
}

impl SensorDescriptor {
    /// Sensor that reads its own key directly, with the class's default unit
    pub fn direct(
        category: &str,
        key: &str,
        display_name: impl Into<String>,
        semantic_class: SemanticClass,
    ) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.into(),
            unit: semantic_class.default_unit().map(str::to_string),
            semantic_class,
            aggregation_policy: AggregationPolicy::Instantaneous,
            category: category.to_string(),
            entity_category: None,
            extractor: Extractor::Direct {
                key: key.to_string(),
            },
        }
    }

    /// Sensor for slot `index` of an indexed family (`cell_voltage_3`)
    pub fn indexed(
        category: &str,
        prefix: &str,
        index: usize,
        display_name: impl Into<String>,
        semantic_class: SemanticClass,
    ) -> Self {
        Self {
            key: rl_protocol::keys::indexed(prefix, index),
            extractor: Extractor::Indexed {
                prefix: prefix.to_string(),
                index,
            },
            ..Self::direct(category, prefix, display_name, semantic_class)
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn without_unit(mut self) -> Self {
        self.unit = None;
        self
    }

    pub fn monotonic(mut self) -> Self {
        self.aggregation_policy = AggregationPolicy::MonotonicIncreasing;
        self
    }

    pub fn diagnostic(mut self) -> Self {
        self.entity_category = Some(EntityCategory::Diagnostic);
        self
    }

    /// Divide the raw value of this sensor's key by `divisor`
    pub fn scaled(mut self, divisor: f64) -> Self {
        self.extractor = Extractor::Scaled {
            key: self.key.clone(),
            divisor,
        };
        self
    }

    pub fn is_measured(&self) -> bool {
        self.semantic_class.is_measured()
    }
}

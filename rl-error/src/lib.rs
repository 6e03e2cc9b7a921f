//! Unified error handling for Renolink
//!
//! This crate provides the error types used across all Renolink components.
//! `RenolinkError` covers fallible setup-time operations (settings, collaborator
//! reports). `ReadingError` describes why a single telemetry value was rejected;
//! the value pipeline logs it and degrades the reading to "no value".

use std::io;
use std::path::PathBuf;

/// Result type alias using RenolinkError
pub type Result<T> = std::result::Result<T, RenolinkError>;

/// Unified error type for all Renolink operations
#[derive(thiserror::Error, Debug)]
pub enum RenolinkError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Collaborator Errors
    // ============================================================================
    #[error("Device report unavailable at {path}: {reason}")]
    ReportUnavailable {
        path: PathBuf,
        reason: String,
    },
}

impl RenolinkError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid configuration value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a report error for a collaborator file
    pub fn report_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReportUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single raw telemetry value was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("invalid numeric value for {key}: {value}")]
    NotNumeric {
        key: String,
        value: String,
    },

    #[error("value {value} out of reasonable range for {key} ({min}..={max})")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("cannot scale non-numeric value for {key}: {value}")]
    NotScalable {
        key: String,
        value: String,
    },
}

impl ReadingError {
    /// Sensor key the rejected value belongs to
    pub fn key(&self) -> &str {
        match self {
            Self::NotNumeric { key, .. }
            | Self::OutOfRange { key, .. }
            | Self::NotScalable { key, .. } => key,
        }
    }
}

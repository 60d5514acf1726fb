//! Error types used throughout the benchmarks
//!
//! Every variant describes a setup failure. The timed region has no error
//! path: a scenario either sets up completely or aborts before timing starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MeterBench
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum MeterBenchError {
    /// Invalid configuration file or environment override.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The library rejected an instrument or its options.
    #[error("Instrument creation failed in {backend}: {message}")]
    InstrumentCreation {
        /// Backend name.
        backend: String,
        /// Library error text.
        message: String,
    },

    /// An instrument name was created twice in one registry.
    #[error("Duplicate registration in {backend}: {metric}")]
    DuplicateRegistration {
        /// Backend name.
        backend: String,
        /// Metric name.
        metric: String,
    },

    /// Exposed metric data could not be interpreted.
    #[error("Readback error: {0}")]
    Readback(String),
}

impl MeterBenchError {
    #[must_use]
    pub fn instrument_creation(backend: &str, message: impl Into<String>) -> Self {
        Self::InstrumentCreation { backend: backend.to_string(), message: message.into() }
    }

    #[must_use]
    pub fn duplicate_registration(backend: &str, metric: impl Into<String>) -> Self {
        Self::DuplicateRegistration { backend: backend.to_string(), metric: metric.into() }
    }

    /// Stable label for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InstrumentCreation { .. } => "instrument_creation",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::Readback(_) => "readback",
        }
    }
}

/// Result type alias for MeterBench operations
pub type Result<T> = std::result::Result<T, MeterBenchError>;

//! Configuration management

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HISTOGRAM_BUCKETS, DEFAULT_ITERATIONS, DEFAULT_LOG_LEVEL, DEFAULT_MEASUREMENT_SECS,
    DEFAULT_SAMPLE_SIZE, DEFAULT_WARM_UP_SECS, MIN_SAMPLE_SIZE,
};
use crate::errors::{MeterBenchError, Result};

/// Benchmark run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Worker threads for parallel scenarios; `None` uses the available
    /// parallelism of the host.
    pub workers: Option<usize>,
    /// Iteration count for standalone (non-criterion) scenario runs.
    pub iterations: u64,
    /// Explicit bucket layout for libraries that accept one.
    pub histogram_buckets: Vec<f64>,
    /// Emit HELP/TYPE metadata for libraries where it is opt-in.
    pub expose_metadata: bool,
    /// Criterion samples per benchmark.
    pub sample_size: usize,
    /// Criterion warm-up time in seconds.
    pub warm_up_secs: u64,
    /// Criterion measurement time in seconds.
    pub measurement_secs: u64,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON log lines instead of the compact format.
    pub json: bool,
}

/// The subset of configuration handed to a backend at setup.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendOptions {
    /// Histogram upper bounds, strictly ascending.
    pub histogram_buckets: Vec<f64>,
    /// Emit HELP metadata where the library makes it optional.
    pub expose_metadata: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workers: None,
            iterations: DEFAULT_ITERATIONS,
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS.to_vec(),
            expose_metadata: true,
            sample_size: DEFAULT_SAMPLE_SIZE,
            warm_up_secs: DEFAULT_WARM_UP_SECS,
            measurement_secs: DEFAULT_MEASUREMENT_SECS,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

impl Default for BackendOptions {
    fn default() -> Self {
        BenchConfig::default().backend_options()
    }
}

impl BackendOptions {
    /// Check the bucket layout.
    ///
    /// # Errors
    /// Returns `MeterBenchError::InstrumentCreation` attributed to `backend`
    /// if the layout is empty, not finite or not strictly ascending.
    pub fn validate(&self, backend: &str) -> Result<()> {
        validate_buckets(&self.histogram_buckets)
            .map_err(|message| MeterBenchError::instrument_creation(backend, message))
    }
}

/// Check that a histogram bucket layout is non-empty, finite and strictly
/// ascending.
///
/// # Errors
/// Returns a description of the first violation.
pub fn validate_buckets(buckets: &[f64]) -> std::result::Result<(), String> {
    if buckets.is_empty() {
        return Err("histogram_buckets must not be empty".to_string());
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err("histogram_buckets must be finite".to_string());
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err("histogram_buckets must be strictly ascending".to_string());
    }
    Ok(())
}

impl BenchConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `MeterBenchError::Config` for a zero worker count, a sample
    /// size or timing criterion would reject, or a bucket layout that is
    /// empty, not finite or not strictly ascending.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(MeterBenchError::Config("workers must be at least 1".to_string()));
        }
        if self.sample_size < MIN_SAMPLE_SIZE {
            return Err(MeterBenchError::Config(format!(
                "sample_size must be at least {MIN_SAMPLE_SIZE}, got {}",
                self.sample_size
            )));
        }
        if self.warm_up_secs == 0 || self.measurement_secs == 0 {
            return Err(MeterBenchError::Config(
                "warm_up_secs and measurement_secs must be positive".to_string(),
            ));
        }
        validate_buckets(&self.histogram_buckets).map_err(MeterBenchError::Config)
    }

    /// Worker count for parallel scenarios.
    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        self.workers
            .and_then(NonZeroUsize::new)
            .or_else(|| std::thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Options handed to each backend's setup.
    #[must_use]
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            histogram_buckets: self.histogram_buckets.clone(),
            expose_metadata: self.expose_metadata,
        }
    }

    #[must_use]
    pub const fn warm_up_time(&self) -> Duration {
        Duration::from_secs(self.warm_up_secs)
    }

    #[must_use]
    pub const fn measurement_time(&self) -> Duration {
        Duration::from_secs(self.measurement_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.iterations, 1_000);
        assert!(config.expose_metadata);
        assert_eq!(config.histogram_buckets.len(), 11);
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config = BenchConfig { workers: Some(0), ..BenchConfig::default() };
        assert!(matches!(config.validate(), Err(MeterBenchError::Config(_))));
    }

    #[test]
    fn test_rejects_unsorted_buckets() {
        let config =
            BenchConfig { histogram_buckets: vec![1.0, 0.5, 2.0], ..BenchConfig::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));

        let config = BenchConfig { histogram_buckets: vec![1.0, f64::NAN], ..BenchConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_options_reject_bad_layouts() {
        for buckets in [vec![], vec![2.0, 1.0], vec![1.0, 1.0], vec![1.0, f64::INFINITY]] {
            let options = BackendOptions { histogram_buckets: buckets, expose_metadata: true };
            let err = options.validate("recorder").unwrap_err();
            assert!(
                matches!(&err, MeterBenchError::InstrumentCreation { backend, .. } if backend == "recorder"),
                "{err}"
            );
        }
        assert!(BackendOptions::default().validate("recorder").is_ok());
    }

    #[test]
    fn test_rejects_small_sample_size() {
        let config = BenchConfig { sample_size: 5, ..BenchConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_measurement_time() {
        let config = BenchConfig { measurement_secs: 0, ..BenchConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_count_prefers_explicit_value() {
        let config = BenchConfig { workers: Some(3), ..BenchConfig::default() };
        assert_eq!(config.worker_count().get(), 3);
        assert!(BenchConfig::default().worker_count().get() >= 1);
    }

    #[test]
    fn test_partial_toml_like_json_uses_defaults() {
        let config: BenchConfig =
            serde_json::from_str(r#"{ "workers": 8, "logging": { "json": true } }"#).unwrap();
        assert_eq!(config.workers, Some(8));
        assert_eq!(config.sample_size, 100);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }
}

//! Benchmark constants
//!
//! Metric names, help strings and the label pair are identical for every
//! backend so label encoding and name handling cost stay comparable.

/// Label values accepted by every backend's label resolution.
pub type LabelValues = [&'static str; 2];

// Label pair
pub const LABEL_KEYS: [&str; 2] = ["label1", "label2"];
pub const LABEL_VALUES: LabelValues = ["value1", "value2"];

// Instrument naming
pub const COUNTER_NAME: &str = "test_counter";
pub const COUNTER_HELP: &str = "A test counter";
pub const HISTOGRAM_NAME: &str = "test_histogram";
pub const HISTOGRAM_HELP: &str = "A test histogram";
pub const METER_NAME: &str = "benchmark";

/// Prometheus default bucket layout.
pub const DEFAULT_HISTOGRAM_BUCKETS: [f64; 11] =
    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

// Run defaults
pub const DEFAULT_ITERATIONS: u64 = 1_000;
pub const DEFAULT_SAMPLE_SIZE: usize = 100;
pub const MIN_SAMPLE_SIZE: usize = 10;
pub const DEFAULT_WARM_UP_SECS: u64 = 3;
pub const DEFAULT_MEASUREMENT_SECS: u64 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

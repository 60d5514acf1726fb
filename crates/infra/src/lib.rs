//! # MeterBench Infrastructure
//!
//! Metrics library adapters implementing the `meterbench-core` port, plus
//! configuration loading and logging setup.
//!
//! This crate contains:
//! - `prometheus` client adapter
//! - `metrics` recorder adapter (Prometheus recorder as a metric set)
//! - OpenTelemetry SDK adapter
//! - Config file and environment loader
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements `MetricsBackend` defined in `meterbench-core`
//! - Contains every dependency on a metrics library

pub mod backends;
pub mod config;
pub mod logging;

// Re-export commonly used items
pub use backends::{OtelBackend, PrometheusBackend, RecorderBackend};

//! Metrics library adapters
//!
//! One [`MetricsBackend`](meterbench_core::MetricsBackend) implementation per
//! library under test:
//! - [`PrometheusBackend`]: the `prometheus` client with an explicit
//!   registry and label-partitioned vectors
//! - [`RecorderBackend`]: the `metrics` facade over its Prometheus recorder,
//!   where a labeled series is looked up by its full key
//! - [`OtelBackend`]: the OpenTelemetry SDK with a manual reader and
//!   per-call attributes

pub mod exposition;
pub mod opentelemetry;
pub mod prometheus;
pub mod recorder;

pub use self::opentelemetry::OtelBackend;
pub use self::prometheus::PrometheusBackend;
pub use self::recorder::RecorderBackend;

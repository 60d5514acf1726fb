//! Scenario run reports

use std::time::Duration;

use meterbench_domain::Scenario;
use serde::Serialize;

/// Outcome of one standalone scenario run.
///
/// Reports are handed back to the caller; the harness never persists them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// `MetricsBackend::NAME` of the measured backend.
    pub backend: &'static str,
    pub scenario: Scenario,
    /// Operations across all workers.
    pub iterations: u64,
    /// Wall-clock time of the timed region.
    pub elapsed: Duration,
}

impl ScenarioReport {
    /// Mean wall-clock cost of one operation in nanoseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn nanos_per_op(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.iterations as f64
    }

    /// Aggregate throughput across all workers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.iterations as f64 / secs
    }
}

#[cfg(test)]
mod tests {
    use meterbench_domain::{Concurrency, LabelMode, MetricKind};

    use super::*;

    fn report(iterations: u64, elapsed: Duration) -> ScenarioReport {
        ScenarioReport {
            backend: "recording",
            scenario: Scenario::new(MetricKind::Counter, LabelMode::None, Concurrency::Serial),
            iterations,
            elapsed,
        }
    }

    #[test]
    fn test_nanos_per_op() {
        let report = report(1_000, Duration::from_micros(50));
        assert!((report.nanos_per_op() - 50.0).abs() < f64::EPSILON);
        assert!((report.ops_per_sec() - 20_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_run_does_not_divide_by_zero() {
        let report = report(0, Duration::ZERO);
        assert_eq!(report.nanos_per_op(), 0.0);
        assert_eq!(report.ops_per_sec(), 0.0);
    }

    #[test]
    fn test_serializes_scenario_axes() {
        let json = serde_json::to_value(report(10, Duration::from_millis(1))).unwrap();
        assert_eq!(json["backend"], "recording");
        assert_eq!(json["scenario"]["kind"], "counter");
        assert_eq!(json["scenario"]["labels"], "none");
        assert_eq!(json["scenario"]["concurrency"], "serial");
    }
}

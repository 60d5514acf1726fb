//! Per-scenario context: setup, timed region, done
//!
//! A context owns the backend's fresh registry and the single instrument the
//! scenario exercises. It is built once outside the timed region and shared
//! read-only by every worker.

use std::hint::black_box;
use std::time::Duration;

use meterbench_domain::load::observation_index;
use meterbench_domain::{
    simulate_observe, BackendOptions, Concurrency, LabelMode, MetricKind, Result, Scenario,
    LABEL_VALUES,
};
use tracing::{debug, error, info};

use super::ports::MetricsBackend;
use super::report::ScenarioReport;
use super::runner::{run_parallel, run_serial};

/// The instrument a scenario operates on, already in its final form.
enum Instrument<B: MetricsBackend> {
    Counter(B::Counter),
    CounterVec(B::CounterVec),
    BoundCounter { bound: B::BoundCounter, _family: B::CounterVec },
    Histogram(B::Histogram),
    HistogramVec(B::HistogramVec),
    BoundHistogram { bound: B::BoundHistogram, _family: B::HistogramVec },
}

/// Scenario state built during setup and passed into the timed region.
pub struct ScenarioContext<B: MetricsBackend> {
    scenario: Scenario,
    backend: B,
    instrument: Instrument<B>,
}

impl<B: MetricsBackend> ScenarioContext<B> {
    /// Create a fresh backend registry and prepare the scenario's instrument.
    ///
    /// # Errors
    /// Propagates any backend setup or instrument creation failure. The
    /// scenario must not be run when this fails.
    pub fn setup(scenario: Scenario, options: &BackendOptions) -> Result<Self> {
        let backend = B::setup(options)?;
        Self::with_backend(scenario, backend)
    }

    /// Prepare the scenario's instrument on an existing backend.
    ///
    /// For [`LabelMode::Cached`] the label handle is resolved here, exactly
    /// once.
    ///
    /// # Errors
    /// Propagates instrument creation and registration failures.
    pub fn with_backend(scenario: Scenario, backend: B) -> Result<Self> {
        let instrument = match (scenario.kind, scenario.labels) {
            (MetricKind::Counter, LabelMode::None) => Instrument::Counter(backend.new_counter()?),
            (MetricKind::Counter, LabelMode::Uncached) => {
                Instrument::CounterVec(backend.new_counter_vec()?)
            }
            (MetricKind::Counter, LabelMode::Cached) => {
                let family = backend.new_counter_vec()?;
                let bound = backend.resolve_counter(&family, LABEL_VALUES);
                Instrument::BoundCounter { bound, _family: family }
            }
            (MetricKind::Histogram, LabelMode::None) => {
                Instrument::Histogram(backend.new_histogram()?)
            }
            (MetricKind::Histogram, LabelMode::Uncached) => {
                Instrument::HistogramVec(backend.new_histogram_vec()?)
            }
            (MetricKind::Histogram, LabelMode::Cached) => {
                let family = backend.new_histogram_vec()?;
                let bound = backend.resolve_histogram(&family, LABEL_VALUES);
                Instrument::BoundHistogram { bound, _family: family }
            }
        };

        debug!(backend = B::NAME, scenario = %scenario, "scenario setup complete");
        Ok(Self { scenario, backend, instrument })
    }

    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Perform one metric operation. `index` feeds the load generator for
    /// histogram observations.
    #[inline]
    pub fn operate(&self, index: i64) {
        match &self.instrument {
            Instrument::Counter(counter) => self.backend.counter_increment(counter),
            Instrument::CounterVec(family) => {
                self.backend.labeled_counter_increment(family, LABEL_VALUES);
            }
            Instrument::BoundCounter { bound, .. } => self.backend.bound_counter_increment(bound),
            Instrument::Histogram(histogram) => {
                self.backend.histogram_observe(histogram, simulate_observe(index));
            }
            Instrument::HistogramVec(family) => {
                self.backend.labeled_histogram_observe(
                    family,
                    LABEL_VALUES,
                    simulate_observe(index),
                );
            }
            Instrument::BoundHistogram { bound, .. } => {
                self.backend.bound_histogram_observe(bound, simulate_observe(index));
            }
        }
    }

    /// Run the timed region for `iterations` operations in total and return
    /// its elapsed time.
    ///
    /// Every histogram observation uses the generator value for the total
    /// iteration count, not a per-call index. Backend upkeep runs after the
    /// clock stops.
    pub fn run(&self, iterations: u64) -> Duration {
        let index = observation_index(iterations);
        let op = || self.operate(black_box(index));

        let elapsed = match self.scenario.concurrency {
            Concurrency::Serial => run_serial(iterations, op),
            Concurrency::Parallel { workers } => run_parallel(iterations, workers, op),
        };
        self.backend.upkeep();
        elapsed
    }
}

/// Run one scenario end to end: setup, timed region, done.
///
/// # Errors
/// Returns the setup error if the backend or instrument cannot be created;
/// nothing is measured in that case.
pub fn execute<B: MetricsBackend>(
    scenario: Scenario,
    options: &BackendOptions,
    iterations: u64,
) -> Result<ScenarioReport> {
    let context = ScenarioContext::<B>::setup(scenario, options).map_err(|err| {
        error!(backend = B::NAME, scenario = %scenario, error = %err, "scenario setup failed");
        err
    })?;

    let elapsed = context.run(iterations);
    let report = ScenarioReport { backend: B::NAME, scenario, iterations, elapsed };

    info!(
        backend = B::NAME,
        scenario = %scenario,
        iterations,
        nanos_per_op = report.nanos_per_op(),
        "scenario finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use meterbench_domain::{MeterBenchError, LABEL_VALUES};

    use super::*;
    use crate::testing::RecordingBackend;

    fn parallel(workers: usize) -> Concurrency {
        Concurrency::Parallel { workers: NonZeroUsize::new(workers).unwrap() }
    }

    fn context(
        kind: MetricKind,
        labels: LabelMode,
        concurrency: Concurrency,
    ) -> ScenarioContext<RecordingBackend> {
        ScenarioContext::setup(Scenario::new(kind, labels, concurrency), &BackendOptions::default())
            .unwrap()
    }

    #[test]
    fn test_serial_counter_counts_every_iteration() {
        let ctx = context(MetricKind::Counter, LabelMode::None, Concurrency::Serial);
        ctx.run(1_000);
        assert_eq!(ctx.backend().counter_total().unwrap(), Some(1_000.0));
    }

    #[test]
    fn test_parallel_counter_loses_no_updates() {
        let ctx = context(MetricKind::Counter, LabelMode::None, parallel(4));
        ctx.run(1_000);
        assert_eq!(ctx.backend().counter_total().unwrap(), Some(1_000.0));
        assert_eq!(ctx.backend().stats().threads, 4);
    }

    #[test]
    fn test_cached_handle_resolved_once_and_shared() {
        let ctx = context(MetricKind::Counter, LabelMode::Cached, parallel(4));
        assert_eq!(ctx.backend().stats().resolutions, 1);

        ctx.run(1_000);
        let stats = ctx.backend().stats();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.bound_handle_addresses, 1);
        assert_eq!(stats.bound_handle_ids, vec![0]);
        assert_eq!(stats.counter_ops, 1_000);
    }

    #[test]
    fn test_cached_histogram_handle_resolved_once() {
        let ctx = context(MetricKind::Histogram, LabelMode::Cached, Concurrency::Serial);
        ctx.run(250);
        let stats = ctx.backend().stats();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.bound_handle_addresses, 1);
        assert_eq!(stats.histogram_ops, 250);
    }

    #[test]
    fn test_uncached_resolves_on_every_operation() {
        let ctx = context(MetricKind::Counter, LabelMode::Uncached, parallel(4));
        assert_eq!(ctx.backend().stats().resolutions, 0);

        ctx.run(1_000);
        let stats = ctx.backend().stats();
        assert_eq!(stats.resolutions, 1_000);
        assert_eq!(stats.counter_ops, 1_000);
        assert_eq!(stats.label_values, vec![LABEL_VALUES]);
    }

    #[test]
    fn test_histogram_observes_generator_value_for_total() {
        let ctx = context(MetricKind::Histogram, LabelMode::Uncached, parallel(3));
        ctx.run(31);
        let stats = ctx.backend().stats();
        assert_eq!(stats.histogram_ops, 31);
        assert_eq!(stats.observations, vec![simulate_observe(31)]);
        assert_eq!(ctx.backend().histogram_sample_count().unwrap(), Some(31));
    }

    #[test]
    fn test_upkeep_follows_every_timed_region() {
        let ctx = context(MetricKind::Histogram, LabelMode::Cached, parallel(2));
        assert_eq!(ctx.backend().stats().upkeeps, 0);

        for run in 1..=5 {
            ctx.run(200);
            let stats = ctx.backend().stats();
            assert_eq!(stats.upkeeps, run);
            // Upkeep saw every operation of the run it followed
            assert_eq!(stats.ops_at_last_upkeep, run * 200);
        }
    }

    #[test]
    fn test_repeated_runs_accumulate_on_same_instrument() {
        let ctx = context(MetricKind::Counter, LabelMode::None, Concurrency::Serial);
        ctx.run(10);
        ctx.run(15);
        assert_eq!(ctx.backend().counter_total().unwrap(), Some(25.0));
    }

    #[test]
    fn test_unlabeled_scenario_never_resolves() {
        let ctx = context(MetricKind::Histogram, LabelMode::None, parallel(2));
        ctx.run(100);
        assert_eq!(ctx.backend().stats().resolutions, 0);
    }

    #[test]
    fn test_duplicate_registration_aborts_setup() {
        let backend = RecordingBackend::default();
        backend.new_counter().unwrap();
        let scenario = Scenario::new(MetricKind::Counter, LabelMode::None, Concurrency::Serial);

        let err = ScenarioContext::with_backend(scenario, backend).err().unwrap();
        assert!(matches!(err, MeterBenchError::DuplicateRegistration { .. }));
    }

    #[test]
    fn test_fresh_backend_per_scenario_allows_rerun() {
        let scenario = Scenario::new(MetricKind::Counter, LabelMode::Cached, Concurrency::Serial);
        for _ in 0..3 {
            let report =
                execute::<RecordingBackend>(scenario, &BackendOptions::default(), 100).unwrap();
            assert_eq!(report.iterations, 100);
            assert_eq!(report.backend, "recording");
        }
    }

    #[test]
    fn test_execute_reports_setup_failure() {
        let scenario = Scenario::new(MetricKind::Histogram, LabelMode::None, Concurrency::Serial);
        let options = BackendOptions { histogram_buckets: Vec::new(), expose_metadata: false };
        let err = execute::<RecordingBackend>(scenario, &options, 100).unwrap_err();
        assert!(matches!(err, MeterBenchError::InstrumentCreation { .. }));
    }

    #[test]
    fn test_every_matrix_scenario_runs() {
        for scenario in Scenario::matrix(NonZeroUsize::new(2).unwrap()) {
            let ctx = ScenarioContext::<RecordingBackend>::setup(
                scenario,
                &BackendOptions::default(),
            )
            .unwrap();
            ctx.run(40);
            let stats = ctx.backend().stats();
            assert_eq!(stats.counter_ops + stats.histogram_ops, 40, "{scenario}");
        }
    }
}

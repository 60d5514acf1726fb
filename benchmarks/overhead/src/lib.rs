//! Criterion drivers for the instrumentation overhead benchmarks.
//!
//! Each bench target registers one backend's full scenario matrix under a
//! benchmark group named after the backend. Criterion picks the iteration
//! count; the harness owns the timed region through `iter_custom`.

use criterion::{Criterion, Throughput};
use meterbench_core::{MetricsBackend, ScenarioContext};
use meterbench_domain::{BenchConfig, Scenario};
use meterbench_infra::{config, logging};

/// Load configuration and install logging for a bench target.
///
/// A missing config file falls back to defaults. An invalid one aborts the
/// target, since every measurement would be taken under the wrong settings.
pub fn init() -> BenchConfig {
    let config = config::load().unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid benchmark configuration");
        panic!("invalid benchmark configuration: {e}")
    });

    if let Err(e) = logging::init(&config.logging) {
        panic!("failed to initialise logging: {e}");
    }

    tracing::info!(
        workers = config.worker_count().get(),
        sample_size = config.sample_size,
        "benchmark configuration loaded"
    );
    config
}

/// Benchmark every scenario against backend `B`.
///
/// Each scenario gets a fresh backend; a setup failure aborts the target.
pub fn bench_backend<B: MetricsBackend>(c: &mut Criterion, config: &BenchConfig) {
    let options = config.backend_options();

    let mut group = c.benchmark_group(B::NAME);
    group.sample_size(config.sample_size);
    group.warm_up_time(config.warm_up_time());
    group.measurement_time(config.measurement_time());
    group.throughput(Throughput::Elements(1));

    for scenario in Scenario::matrix(config.worker_count()) {
        let ctx = ScenarioContext::<B>::setup(scenario, &options).unwrap_or_else(|e| {
            tracing::error!(backend = B::NAME, scenario = %scenario, error = %e, "setup failed");
            panic!("{} setup failed for {scenario}: {e}", B::NAME)
        });

        group.bench_function(scenario.id(), |b| b.iter_custom(|iters| ctx.run(iters)));
    }

    group.finish();
}

use criterion::{criterion_group, criterion_main, Criterion};
use meterbench_infra::PrometheusBackend;

// Run this benchmark with:
// cargo bench -p overhead-bench --bench prometheus
fn prometheus_overhead(c: &mut Criterion) {
    let config = overhead_bench::init();
    overhead_bench::bench_backend::<PrometheusBackend>(c, &config);
}

criterion_group!(benches, prometheus_overhead);
criterion_main!(benches);

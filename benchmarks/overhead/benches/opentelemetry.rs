use criterion::{criterion_group, criterion_main, Criterion};
use meterbench_infra::OtelBackend;

// Run this benchmark with:
// cargo bench -p overhead-bench --bench opentelemetry
fn opentelemetry_overhead(c: &mut Criterion) {
    let config = overhead_bench::init();
    overhead_bench::bench_backend::<OtelBackend>(c, &config);
}

criterion_group!(benches, opentelemetry_overhead);
criterion_main!(benches);

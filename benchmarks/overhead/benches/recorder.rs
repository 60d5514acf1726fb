use criterion::{criterion_group, criterion_main, Criterion};
use meterbench_infra::RecorderBackend;

// Run this benchmark with:
// cargo bench -p overhead-bench --bench recorder
fn recorder_overhead(c: &mut Criterion) {
    let config = overhead_bench::init();
    overhead_bench::bench_backend::<RecorderBackend>(c, &config);
}

criterion_group!(benches, recorder_overhead);
criterion_main!(benches);

//! Timed region runners
//!
//! Both runners take the operation as a closure and return the wall-clock
//! time of the timed region only. Nothing here allocates, locks or logs
//! between the first and the last operation.

use std::num::NonZeroUsize;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

/// Run `op` back-to-back `iterations` times on the calling thread.
pub fn run_serial<F>(iterations: u64, op: F) -> Duration
where
    F: Fn(),
{
    let start = Instant::now();
    for _ in 0..iterations {
        op();
    }
    start.elapsed()
}

/// Split `iterations` across `workers`, spreading the remainder over the
/// first workers. Workers that would receive no iterations are omitted.
#[must_use]
pub fn partition(iterations: u64, workers: NonZeroUsize) -> Vec<u64> {
    let workers = workers.get() as u64;
    let base = iterations / workers;
    let remainder = iterations % workers;

    (0..workers).map(|idx| base + u64::from(idx < remainder)).filter(|&share| share > 0).collect()
}

/// Run `iterations` operations split across `workers` scoped threads.
///
/// Workers are released together by a start barrier and then loop
/// independently. The clock starts when the barrier opens and stops once the
/// last worker has been joined, so thread spawn cost is excluded.
pub fn run_parallel<F>(iterations: u64, workers: NonZeroUsize, op: F) -> Duration
where
    F: Fn() + Sync,
{
    let shares = partition(iterations, workers);
    let barrier = Barrier::new(shares.len() + 1);
    let op = &op;
    let barrier = &barrier;

    let start = thread::scope(|scope| {
        for share in shares {
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..share {
                    op();
                }
            });
        }
        barrier.wait();
        Instant::now()
    });

    start.elapsed()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_partition_spreads_remainder() {
        assert_eq!(partition(10, workers(4)), vec![3, 3, 2, 2]);
        assert_eq!(partition(1_000, workers(4)), vec![250; 4]);
        assert_eq!(partition(2, workers(4)), vec![1, 1]);
        assert!(partition(0, workers(4)).is_empty());
    }

    #[test]
    fn test_partition_preserves_total() {
        for total in [0_u64, 1, 7, 999, 1_000, 65_537] {
            for n in 1..=9 {
                assert_eq!(partition(total, workers(n)).iter().sum::<u64>(), total);
            }
        }
    }

    #[test]
    fn test_serial_runs_exact_count() {
        let calls = AtomicU64::new(0);
        run_serial(1_000, || {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 1_000);
    }

    #[test]
    fn test_parallel_runs_exact_count() {
        let calls = AtomicU64::new(0);
        run_parallel(1_003, workers(4), || {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 1_003);
    }

    #[test]
    fn test_parallel_uses_distinct_threads() {
        let seen = parking_lot::Mutex::new(std::collections::HashSet::new());
        run_parallel(64, workers(4), || {
            seen.lock().insert(thread::current().id());
        });
        assert_eq!(seen.lock().len(), 4);
    }

    #[test]
    fn test_parallel_with_zero_iterations_returns() {
        let elapsed = run_parallel(0, workers(8), || unreachable!());
        assert!(elapsed < Duration::from_secs(5));
    }
}

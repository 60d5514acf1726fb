//! Recording backend for exercising the harness without a metrics library
//!
//! `RecordingBackend` implements [`MetricsBackend`] with plain atomics and
//! records what the timed region did: operation counts, label resolutions,
//! which bound handles were used, which threads ran, and which values were
//! observed.

// Test double: the recording path takes a lock per operation and is not
// meant to be benchmarked.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use meterbench_domain::{
    BackendOptions, LabelValues, MeterBenchError, Result, COUNTER_NAME, HISTOGRAM_NAME,
};
use parking_lot::Mutex;

use crate::harness::MetricsBackend;

const BACKEND_NAME: &str = "recording";

/// Unlabeled instrument or label family created by the recording backend.
#[derive(Debug)]
pub struct RecordedInstrument {
    pub name: &'static str,
}

/// Label-bound handle; `id` is the resolution sequence number.
#[derive(Debug)]
pub struct RecordedHandle {
    pub id: u64,
    pub values: LabelValues,
}

/// Snapshot of everything the backend has recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingStats {
    pub counter_ops: u64,
    pub histogram_ops: u64,
    pub resolutions: u64,
    /// Upkeep calls made after timed regions.
    pub upkeeps: u64,
    /// Operations recorded when the last upkeep ran.
    pub ops_at_last_upkeep: u64,
    /// Distinct memory addresses of bound handles used by operations.
    pub bound_handle_addresses: usize,
    /// Distinct resolution ids of bound handles used by operations, sorted.
    pub bound_handle_ids: Vec<u64>,
    /// Distinct label value pairs seen at resolution.
    pub label_values: Vec<LabelValues>,
    /// Distinct observed histogram values, sorted.
    pub observations: Vec<f64>,
    /// Distinct threads that performed operations.
    pub threads: usize,
}

#[derive(Debug, Default)]
struct Seen {
    addresses: HashSet<usize>,
    ids: HashSet<u64>,
    label_values: HashSet<LabelValues>,
    observation_bits: HashSet<u64>,
    threads: HashSet<ThreadId>,
}

/// In-memory [`MetricsBackend`] that records harness behaviour.
#[derive(Debug)]
pub struct RecordingBackend {
    counter_ops: AtomicU64,
    histogram_ops: AtomicU64,
    resolutions: AtomicU64,
    upkeeps: AtomicU64,
    ops_at_last_upkeep: AtomicU64,
    registered: Mutex<HashSet<&'static str>>,
    seen: Mutex<Seen>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            counter_ops: AtomicU64::new(0),
            histogram_ops: AtomicU64::new(0),
            resolutions: AtomicU64::new(0),
            upkeeps: AtomicU64::new(0),
            ops_at_last_upkeep: AtomicU64::new(0),
            registered: Mutex::new(HashSet::new()),
            seen: Mutex::new(Seen::default()),
        }
    }
}

impl RecordingBackend {
    #[must_use]
    pub fn stats(&self) -> RecordingStats {
        let seen = self.seen.lock();
        let mut ids: Vec<u64> = seen.ids.iter().copied().collect();
        ids.sort_unstable();
        let mut observations: Vec<f64> =
            seen.observation_bits.iter().map(|bits| f64::from_bits(*bits)).collect();
        observations.sort_by(f64::total_cmp);

        RecordingStats {
            counter_ops: self.counter_ops.load(Ordering::SeqCst),
            histogram_ops: self.histogram_ops.load(Ordering::SeqCst),
            resolutions: self.resolutions.load(Ordering::SeqCst),
            upkeeps: self.upkeeps.load(Ordering::SeqCst),
            ops_at_last_upkeep: self.ops_at_last_upkeep.load(Ordering::SeqCst),
            bound_handle_addresses: seen.addresses.len(),
            bound_handle_ids: ids,
            label_values: seen.label_values.iter().copied().collect(),
            observations,
            threads: seen.threads.len(),
        }
    }

    fn register(&self, name: &'static str) -> Result<RecordedInstrument> {
        if !self.registered.lock().insert(name) {
            return Err(MeterBenchError::duplicate_registration(BACKEND_NAME, name));
        }
        Ok(RecordedInstrument { name })
    }

    fn resolve(&self, values: LabelValues) -> RecordedHandle {
        let id = self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().label_values.insert(values);
        RecordedHandle { id, values }
    }

    fn touch(&self, handle: Option<&RecordedHandle>, observation: Option<f64>) {
        let mut seen = self.seen.lock();
        seen.threads.insert(thread::current().id());
        if let Some(handle) = handle {
            seen.addresses.insert(std::ptr::from_ref(handle) as usize);
            seen.ids.insert(handle.id);
        }
        if let Some(value) = observation {
            seen.observation_bits.insert(value.to_bits());
        }
    }
}

impl MetricsBackend for RecordingBackend {
    const NAME: &'static str = BACKEND_NAME;

    type Counter = RecordedInstrument;
    type CounterVec = RecordedInstrument;
    type BoundCounter = RecordedHandle;
    type Histogram = RecordedInstrument;
    type HistogramVec = RecordedInstrument;
    type BoundHistogram = RecordedHandle;

    fn setup(options: &BackendOptions) -> Result<Self> {
        options.validate(Self::NAME)?;
        Ok(Self::default())
    }

    fn new_counter(&self) -> Result<Self::Counter> {
        self.register(COUNTER_NAME)
    }

    fn counter_increment(&self, _counter: &Self::Counter) {
        self.touch(None, None);
        self.counter_ops.fetch_add(1, Ordering::SeqCst);
    }

    fn new_counter_vec(&self) -> Result<Self::CounterVec> {
        self.register(COUNTER_NAME)
    }

    fn resolve_counter(&self, _vec: &Self::CounterVec, values: LabelValues) -> Self::BoundCounter {
        self.resolve(values)
    }

    fn bound_counter_increment(&self, counter: &Self::BoundCounter) {
        self.touch(Some(counter), None);
        self.counter_ops.fetch_add(1, Ordering::SeqCst);
    }

    fn new_histogram(&self) -> Result<Self::Histogram> {
        self.register(HISTOGRAM_NAME)
    }

    fn histogram_observe(&self, _histogram: &Self::Histogram, value: f64) {
        self.touch(None, Some(value));
        self.histogram_ops.fetch_add(1, Ordering::SeqCst);
    }

    fn new_histogram_vec(&self) -> Result<Self::HistogramVec> {
        self.register(HISTOGRAM_NAME)
    }

    fn resolve_histogram(
        &self,
        _vec: &Self::HistogramVec,
        values: LabelValues,
    ) -> Self::BoundHistogram {
        self.resolve(values)
    }

    fn bound_histogram_observe(&self, histogram: &Self::BoundHistogram, value: f64) {
        self.touch(Some(histogram), Some(value));
        self.histogram_ops.fetch_add(1, Ordering::SeqCst);
    }

    fn upkeep(&self) {
        let ops =
            self.counter_ops.load(Ordering::SeqCst) + self.histogram_ops.load(Ordering::SeqCst);
        self.ops_at_last_upkeep.store(ops, Ordering::SeqCst);
        self.upkeeps.fetch_add(1, Ordering::SeqCst);
    }

    #[allow(clippy::cast_precision_loss)]
    fn counter_total(&self) -> Result<Option<f64>> {
        Ok(Some(self.counter_ops.load(Ordering::SeqCst) as f64))
    }

    fn histogram_sample_count(&self) -> Result<Option<u64>> {
        Ok(Some(self.histogram_ops.load(Ordering::SeqCst)))
    }
}

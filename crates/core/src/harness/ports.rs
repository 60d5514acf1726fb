//! Port interface for metrics client libraries
//!
//! Each library under test is wrapped by one `MetricsBackend` adapter. The
//! harness is written once against this trait and run once per adapter.

use meterbench_domain::{BackendOptions, LabelValues, Result};

/// Capability interface over a metrics client library.
///
/// A backend value owns one fresh registry (or set, or meter provider) and
/// is created per scenario. Instrument handles must be shareable across the
/// workers of a parallel scenario.
///
/// The `*_vec` instruments stand for label-partitioned families. Resolving a
/// family against label values yields a bound handle; the cached scenario
/// resolves once during setup, the uncached scenario resolves on every
/// operation through `labeled_counter_increment` and
/// `labeled_histogram_observe`.
pub trait MetricsBackend: Send + Sync + Sized {
    /// Backend identifier used in benchmark group names and logs.
    const NAME: &'static str;

    type Counter: Send + Sync;
    type CounterVec: Send + Sync;
    type BoundCounter: Send + Sync;
    type Histogram: Send + Sync;
    type HistogramVec: Send + Sync;
    type BoundHistogram: Send + Sync;

    /// Create the per-scenario registry.
    ///
    /// # Errors
    /// Returns `MeterBenchError::InstrumentCreation` when the library rejects
    /// the options (e.g. the bucket layout).
    fn setup(options: &BackendOptions) -> Result<Self>;

    /// Create (and register, where the library requires it) an unlabeled
    /// counter.
    ///
    /// # Errors
    /// Returns `MeterBenchError::DuplicateRegistration` if the counter already
    /// exists in this registry, or `MeterBenchError::InstrumentCreation` for
    /// any other library failure.
    fn new_counter(&self) -> Result<Self::Counter>;

    fn counter_increment(&self, counter: &Self::Counter);

    /// Create a counter family keyed by `LABEL_KEYS`.
    ///
    /// # Errors
    /// Same as [`MetricsBackend::new_counter`].
    fn new_counter_vec(&self) -> Result<Self::CounterVec>;

    fn resolve_counter(&self, vec: &Self::CounterVec, values: LabelValues) -> Self::BoundCounter;

    fn bound_counter_increment(&self, counter: &Self::BoundCounter);

    /// Uncached path: resolve labels and increment in one operation.
    #[inline]
    fn labeled_counter_increment(&self, vec: &Self::CounterVec, values: LabelValues) {
        let bound = self.resolve_counter(vec, values);
        self.bound_counter_increment(&bound);
    }

    /// Create an unlabeled histogram.
    ///
    /// # Errors
    /// Same as [`MetricsBackend::new_counter`].
    fn new_histogram(&self) -> Result<Self::Histogram>;

    fn histogram_observe(&self, histogram: &Self::Histogram, value: f64);

    /// Create a histogram family keyed by `LABEL_KEYS`.
    ///
    /// # Errors
    /// Same as [`MetricsBackend::new_counter`].
    fn new_histogram_vec(&self) -> Result<Self::HistogramVec>;

    fn resolve_histogram(
        &self,
        vec: &Self::HistogramVec,
        values: LabelValues,
    ) -> Self::BoundHistogram;

    fn bound_histogram_observe(&self, histogram: &Self::BoundHistogram, value: f64);

    /// Uncached path: resolve labels and observe in one operation.
    #[inline]
    fn labeled_histogram_observe(&self, vec: &Self::HistogramVec, values: LabelValues, value: f64) {
        let bound = self.resolve_histogram(vec, values);
        self.bound_histogram_observe(&bound, value);
    }

    /// Untimed housekeeping between timed regions.
    ///
    /// Libraries that buffer raw samples until they are scraped drain them
    /// here, so memory stays bounded across repeated runs. The default does
    /// nothing.
    fn upkeep(&self) {}

    /// Total counted across every counter this backend created, if the
    /// library exposes its values.
    ///
    /// # Errors
    /// Returns `MeterBenchError::Readback` if the exposed data cannot be
    /// interpreted.
    fn counter_total(&self) -> Result<Option<f64>> {
        Ok(None)
    }

    /// Observations recorded across every histogram this backend created, if
    /// the library exposes them.
    ///
    /// # Errors
    /// Same as [`MetricsBackend::counter_total`].
    fn histogram_sample_count(&self) -> Result<Option<u64>> {
        Ok(None)
    }
}

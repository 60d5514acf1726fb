//! `metrics` recorder adapter
//!
//! Uses the `metrics` facade with the Prometheus recorder from
//! `metrics-exporter-prometheus` as a metric set. A labeled series is looked
//! up by its full key (name plus labels) on every resolution, the same way a
//! get-or-create-by-name metric set works. Recorder-level metadata is opt-in
//! through [`BackendOptions::expose_metadata`].

use std::collections::HashSet;

use meterbench_core::MetricsBackend;
use meterbench_domain::{
    BackendOptions, LabelValues, MeterBenchError, Result, COUNTER_HELP, COUNTER_NAME,
    HISTOGRAM_HELP, HISTOGRAM_NAME, LABEL_KEYS,
};
use metrics::{Counter, Histogram, Key, KeyName, Label, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use parking_lot::Mutex;

use super::exposition;

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// A named metric family; series are created on resolution.
#[derive(Debug, Clone)]
pub struct Family {
    name: &'static str,
}

/// Adapter over a fresh, non-global Prometheus recorder.
pub struct RecorderBackend {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    expose_metadata: bool,
    registered: Mutex<HashSet<Key>>,
}

impl RecorderBackend {
    /// Render the recorder state in the text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Claim `name` in this set; a name can be created only once.
    fn claim(&self, name: &'static str) -> Result<Key> {
        let key = Key::from_static_name(name);
        if !self.registered.lock().insert(key.clone()) {
            return Err(MeterBenchError::duplicate_registration(Self::NAME, name));
        }
        Ok(key)
    }

    fn series_key(name: &'static str, values: LabelValues) -> Key {
        let labels = LABEL_KEYS
            .into_iter()
            .zip(values)
            .map(|(key, value)| Label::from_static_parts(key, value))
            .collect::<Vec<_>>();
        Key::from_parts(name, labels)
    }

    fn describe_counter(&self) {
        if self.expose_metadata {
            self.recorder.describe_counter(
                KeyName::from_const_str(COUNTER_NAME),
                None,
                SharedString::const_str(COUNTER_HELP),
            );
        }
    }

    fn describe_histogram(&self) {
        if self.expose_metadata {
            self.recorder.describe_histogram(
                KeyName::from_const_str(HISTOGRAM_NAME),
                None,
                SharedString::const_str(HISTOGRAM_HELP),
            );
        }
    }
}

impl MetricsBackend for RecorderBackend {
    const NAME: &'static str = "recorder";

    type Counter = Counter;
    type CounterVec = Family;
    type BoundCounter = Counter;
    type Histogram = Histogram;
    type HistogramVec = Family;
    type BoundHistogram = Histogram;

    fn setup(options: &BackendOptions) -> Result<Self> {
        options.validate(Self::NAME)?;
        let recorder = PrometheusBuilder::new()
            .set_buckets(&options.histogram_buckets)
            .map_err(|e| MeterBenchError::instrument_creation(Self::NAME, e.to_string()))?
            .build_recorder();
        let handle = recorder.handle();

        Ok(Self {
            recorder,
            handle,
            expose_metadata: options.expose_metadata,
            registered: Mutex::new(HashSet::new()),
        })
    }

    fn new_counter(&self) -> Result<Counter> {
        let key = self.claim(COUNTER_NAME)?;
        self.describe_counter();
        Ok(self.recorder.register_counter(&key, &METADATA))
    }

    #[inline]
    fn counter_increment(&self, counter: &Counter) {
        counter.increment(1);
    }

    fn new_counter_vec(&self) -> Result<Family> {
        self.claim(COUNTER_NAME)?;
        self.describe_counter();
        Ok(Family { name: COUNTER_NAME })
    }

    #[inline]
    fn resolve_counter(&self, vec: &Family, values: LabelValues) -> Counter {
        self.recorder.register_counter(&Self::series_key(vec.name, values), &METADATA)
    }

    #[inline]
    fn bound_counter_increment(&self, counter: &Counter) {
        counter.increment(1);
    }

    fn new_histogram(&self) -> Result<Histogram> {
        let key = self.claim(HISTOGRAM_NAME)?;
        self.describe_histogram();
        Ok(self.recorder.register_histogram(&key, &METADATA))
    }

    #[inline]
    fn histogram_observe(&self, histogram: &Histogram, value: f64) {
        histogram.record(value);
    }

    fn new_histogram_vec(&self) -> Result<Family> {
        self.claim(HISTOGRAM_NAME)?;
        self.describe_histogram();
        Ok(Family { name: HISTOGRAM_NAME })
    }

    #[inline]
    fn resolve_histogram(&self, vec: &Family, values: LabelValues) -> Histogram {
        self.recorder.register_histogram(&Self::series_key(vec.name, values), &METADATA)
    }

    #[inline]
    fn bound_histogram_observe(&self, histogram: &Histogram, value: f64) {
        histogram.record(value);
    }

    /// Drain buffered histogram samples into their bucket distributions.
    fn upkeep(&self) {
        self.handle.run_upkeep();
    }

    fn counter_total(&self) -> Result<Option<f64>> {
        exposition::sum_samples(&self.render(), COUNTER_NAME)
    }

    fn histogram_sample_count(&self) -> Result<Option<u64>> {
        let count = exposition::sum_samples(&self.render(), &format!("{HISTOGRAM_NAME}_count"))?;
        Ok(exposition::sample_count(count))
    }
}

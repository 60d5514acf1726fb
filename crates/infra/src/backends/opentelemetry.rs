//! OpenTelemetry SDK adapter
//!
//! Instruments come from a meter on a fresh [`SdkMeterProvider`] with a
//! [`ManualReader`]; nothing is exported. Attributes are passed with every
//! measurement, so an OpenTelemetry instrument is its own family. A bound
//! handle is the instrument plus an attribute set built once.
//!
//! The reader is shared between the provider and the backend so counts can
//! be collected on demand.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use meterbench_core::MetricsBackend;
use meterbench_domain::{
    BackendOptions, LabelValues, MeterBenchError, Result, COUNTER_HELP, COUNTER_NAME,
    HISTOGRAM_HELP, HISTOGRAM_NAME, LABEL_KEYS, METER_NAME,
};
use opentelemetry::metrics::{Counter, Histogram, Meter, MeterProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::{self, Metric, ResourceMetrics};
use opentelemetry_sdk::metrics::reader::MetricReader;
use opentelemetry_sdk::metrics::{
    InstrumentKind, ManualReader, MetricResult, Pipeline, SdkMeterProvider, Temporality,
};
use opentelemetry_sdk::Resource;
use parking_lot::Mutex;

/// An instrument paired with a prebuilt attribute set.
#[derive(Debug, Clone)]
pub struct Bound<I> {
    instrument: I,
    attributes: Vec<KeyValue>,
}

/// Reader handle that both the provider and the backend hold.
#[derive(Debug, Clone)]
struct SharedReader(Arc<ManualReader>);

impl MetricReader for SharedReader {
    fn register_pipeline(&self, pipeline: Weak<Pipeline>) {
        self.0.register_pipeline(pipeline);
    }

    fn collect(&self, rm: &mut ResourceMetrics) -> MetricResult<()> {
        self.0.collect(rm)
    }

    fn force_flush(&self) -> MetricResult<()> {
        self.0.force_flush()
    }

    fn shutdown(&self) -> MetricResult<()> {
        self.0.shutdown()
    }

    fn temporality(&self, kind: InstrumentKind) -> Temporality {
        self.0.temporality(kind)
    }
}

/// Adapter over a fresh OpenTelemetry meter provider.
pub struct OtelBackend {
    provider: SdkMeterProvider,
    reader: SharedReader,
    meter: Meter,
    buckets: Vec<f64>,
    registered: Mutex<HashSet<&'static str>>,
}

impl OtelBackend {
    /// The provider owning this backend's meter.
    #[must_use]
    pub const fn provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    fn claim(&self, name: &'static str) -> Result<()> {
        if !self.registered.lock().insert(name) {
            return Err(MeterBenchError::duplicate_registration(Self::NAME, name));
        }
        Ok(())
    }

    fn counter(&self) -> Result<Counter<u64>> {
        self.claim(COUNTER_NAME)?;
        Ok(self.meter.u64_counter(COUNTER_NAME).with_description(COUNTER_HELP).build())
    }

    fn histogram(&self) -> Result<Histogram<f64>> {
        self.claim(HISTOGRAM_NAME)?;
        Ok(self
            .meter
            .f64_histogram(HISTOGRAM_NAME)
            .with_description(HISTOGRAM_HELP)
            .with_boundaries(self.buckets.clone())
            .build())
    }

    /// Collect cumulative data and hand every metric named `name` to `f`.
    fn collect_metric<T>(&self, name: &str, f: impl Fn(&Metric) -> Result<T>) -> Result<Vec<T>> {
        let mut rm = ResourceMetrics { resource: Resource::empty(), scope_metrics: Vec::new() };
        self.reader
            .collect(&mut rm)
            .map_err(|e| MeterBenchError::Readback(format!("opentelemetry collect failed: {e}")))?;

        rm.scope_metrics
            .iter()
            .flat_map(|scope| scope.metrics.iter())
            .filter(|metric| metric.name == name)
            .map(f)
            .collect()
    }
}

fn unexpected_aggregation(name: &str) -> MeterBenchError {
    MeterBenchError::Readback(format!("unexpected aggregation for {name}"))
}

#[inline]
fn attributes(values: LabelValues) -> [KeyValue; 2] {
    [KeyValue::new(LABEL_KEYS[0], values[0]), KeyValue::new(LABEL_KEYS[1], values[1])]
}

impl MetricsBackend for OtelBackend {
    const NAME: &'static str = "opentelemetry";

    type Counter = Counter<u64>;
    type CounterVec = Counter<u64>;
    type BoundCounter = Bound<Counter<u64>>;
    type Histogram = Histogram<f64>;
    type HistogramVec = Histogram<f64>;
    type BoundHistogram = Bound<Histogram<f64>>;

    fn setup(options: &BackendOptions) -> Result<Self> {
        options.validate(Self::NAME)?;

        let reader = SharedReader(Arc::new(ManualReader::builder().build()));
        let provider = SdkMeterProvider::builder().with_reader(reader.clone()).build();
        let meter = provider.meter(METER_NAME);

        Ok(Self {
            provider,
            reader,
            meter,
            buckets: options.histogram_buckets.clone(),
            registered: Mutex::new(HashSet::new()),
        })
    }

    fn new_counter(&self) -> Result<Counter<u64>> {
        self.counter()
    }

    #[inline]
    fn counter_increment(&self, counter: &Counter<u64>) {
        counter.add(1, &[]);
    }

    fn new_counter_vec(&self) -> Result<Counter<u64>> {
        self.counter()
    }

    fn resolve_counter(&self, vec: &Counter<u64>, values: LabelValues) -> Bound<Counter<u64>> {
        Bound { instrument: vec.clone(), attributes: attributes(values).to_vec() }
    }

    #[inline]
    fn bound_counter_increment(&self, counter: &Bound<Counter<u64>>) {
        counter.instrument.add(1, &counter.attributes);
    }

    #[inline]
    fn labeled_counter_increment(&self, vec: &Counter<u64>, values: LabelValues) {
        vec.add(1, &attributes(values));
    }

    fn new_histogram(&self) -> Result<Histogram<f64>> {
        self.histogram()
    }

    #[inline]
    fn histogram_observe(&self, histogram: &Histogram<f64>, value: f64) {
        histogram.record(value, &[]);
    }

    fn new_histogram_vec(&self) -> Result<Histogram<f64>> {
        self.histogram()
    }

    fn resolve_histogram(
        &self,
        vec: &Histogram<f64>,
        values: LabelValues,
    ) -> Bound<Histogram<f64>> {
        Bound { instrument: vec.clone(), attributes: attributes(values).to_vec() }
    }

    #[inline]
    fn bound_histogram_observe(&self, histogram: &Bound<Histogram<f64>>, value: f64) {
        histogram.instrument.record(value, &histogram.attributes);
    }

    #[inline]
    fn labeled_histogram_observe(&self, vec: &Histogram<f64>, values: LabelValues, value: f64) {
        vec.record(value, &attributes(values));
    }

    // Counts are exact integers well below 2^53.
    #[allow(clippy::cast_precision_loss)]
    fn counter_total(&self) -> Result<Option<f64>> {
        let totals = self.collect_metric(COUNTER_NAME, |metric| {
            let sum = metric
                .data
                .as_any()
                .downcast_ref::<data::Sum<u64>>()
                .ok_or_else(|| unexpected_aggregation(COUNTER_NAME))?;
            Ok(sum.data_points.iter().map(|point| point.value).sum::<u64>())
        })?;

        Ok((!totals.is_empty()).then(|| totals.iter().sum::<u64>() as f64))
    }

    fn histogram_sample_count(&self) -> Result<Option<u64>> {
        let counts = self.collect_metric(HISTOGRAM_NAME, |metric| {
            let histogram = metric
                .data
                .as_any()
                .downcast_ref::<data::Histogram<f64>>()
                .ok_or_else(|| unexpected_aggregation(HISTOGRAM_NAME))?;
            Ok(histogram.data_points.iter().map(|point| point.count).sum::<u64>())
        })?;

        Ok((!counts.is_empty()).then(|| counts.iter().sum()))
    }
}

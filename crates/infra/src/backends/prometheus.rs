//! `prometheus` client adapter
//!
//! Every scenario gets its own [`Registry`]; instruments are registered into
//! it explicitly. Label resolution goes through `with_label_values`, which
//! hashes the values and looks up (or creates) the child series.

use meterbench_core::MetricsBackend;
use meterbench_domain::{
    BackendOptions, LabelValues, MeterBenchError, Result, COUNTER_HELP, COUNTER_NAME,
    HISTOGRAM_HELP, HISTOGRAM_NAME, LABEL_KEYS,
};
use prometheus::core::Collector;
use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use super::exposition;

/// Adapter over a fresh `prometheus::Registry`.
pub struct PrometheusBackend {
    registry: Registry,
    buckets: Vec<f64>,
}

impl PrometheusBackend {
    /// The registry instruments are registered into.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render the registry in the text exposition format.
    ///
    /// # Errors
    /// Returns `MeterBenchError::Readback` if encoding fails.
    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(|e| MeterBenchError::Readback(format!("prometheus encoding failed: {e}")))
    }

    fn register<C>(&self, collector: C, metric: &str) -> Result<C>
    where
        C: Collector + Clone + 'static,
    {
        self.registry.register(Box::new(collector.clone())).map_err(|e| match e {
            prometheus::Error::AlreadyReg => {
                MeterBenchError::duplicate_registration(Self::NAME, metric)
            }
            other => creation_error(&other),
        })?;
        Ok(collector)
    }

    fn histogram_opts(&self) -> HistogramOpts {
        HistogramOpts::new(HISTOGRAM_NAME, HISTOGRAM_HELP).buckets(self.buckets.clone())
    }
}

fn creation_error(err: &prometheus::Error) -> MeterBenchError {
    MeterBenchError::instrument_creation(PrometheusBackend::NAME, err.to_string())
}

impl MetricsBackend for PrometheusBackend {
    const NAME: &'static str = "prometheus";

    type Counter = Counter;
    type CounterVec = CounterVec;
    type BoundCounter = Counter;
    type Histogram = Histogram;
    type HistogramVec = HistogramVec;
    type BoundHistogram = Histogram;

    fn setup(options: &BackendOptions) -> Result<Self> {
        options.validate(Self::NAME)?;
        Ok(Self { registry: Registry::new(), buckets: options.histogram_buckets.clone() })
    }

    fn new_counter(&self) -> Result<Counter> {
        let counter = Counter::with_opts(Opts::new(COUNTER_NAME, COUNTER_HELP))
            .map_err(|e| creation_error(&e))?;
        self.register(counter, COUNTER_NAME)
    }

    #[inline]
    fn counter_increment(&self, counter: &Counter) {
        counter.inc();
    }

    fn new_counter_vec(&self) -> Result<CounterVec> {
        let vec = CounterVec::new(Opts::new(COUNTER_NAME, COUNTER_HELP), &LABEL_KEYS)
            .map_err(|e| creation_error(&e))?;
        self.register(vec, COUNTER_NAME)
    }

    #[inline]
    fn resolve_counter(&self, vec: &CounterVec, values: LabelValues) -> Counter {
        vec.with_label_values(values.as_slice())
    }

    #[inline]
    fn bound_counter_increment(&self, counter: &Counter) {
        counter.inc();
    }

    fn new_histogram(&self) -> Result<Histogram> {
        let histogram =
            Histogram::with_opts(self.histogram_opts()).map_err(|e| creation_error(&e))?;
        self.register(histogram, HISTOGRAM_NAME)
    }

    #[inline]
    fn histogram_observe(&self, histogram: &Histogram, value: f64) {
        histogram.observe(value);
    }

    fn new_histogram_vec(&self) -> Result<HistogramVec> {
        let vec = HistogramVec::new(self.histogram_opts(), &LABEL_KEYS)
            .map_err(|e| creation_error(&e))?;
        self.register(vec, HISTOGRAM_NAME)
    }

    #[inline]
    fn resolve_histogram(&self, vec: &HistogramVec, values: LabelValues) -> Histogram {
        vec.with_label_values(values.as_slice())
    }

    #[inline]
    fn bound_histogram_observe(&self, histogram: &Histogram, value: f64) {
        histogram.observe(value);
    }

    fn counter_total(&self) -> Result<Option<f64>> {
        exposition::sum_samples(&self.render()?, COUNTER_NAME)
    }

    fn histogram_sample_count(&self) -> Result<Option<u64>> {
        let count = exposition::sum_samples(&self.render()?, &format!("{HISTOGRAM_NAME}_count"))?;
        Ok(exposition::sample_count(count))
    }
}

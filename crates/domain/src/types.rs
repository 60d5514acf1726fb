//! Scenario types
//!
//! A scenario is one combination of metric kind, label mode and concurrency
//! mode. It is constructed per run, executed once and discarded.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::impl_scenario_axis_conversions;

/// Instrument family under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Monotonic counter incremented by one.
    Counter,
    /// Histogram fed by the load generator.
    Histogram,
}

impl_scenario_axis_conversions!(MetricKind {
    Counter => "counter",
    Histogram => "histogram",
});

/// How labels are attached to each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Plain instrument, no labels.
    None,
    /// Labels resolved inside the timed region on every operation.
    Uncached,
    /// Labels resolved once during setup; the bound handle is reused.
    Cached,
}

impl_scenario_axis_conversions!(LabelMode {
    None => "no_labels",
    Uncached => "uncached_labels",
    Cached => "cached_labels",
});

/// Concurrency axis without the worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// One thread.
    Serial,
    /// Several worker threads.
    Parallel,
}

impl_scenario_axis_conversions!(ConcurrencyMode {
    Serial => "serial",
    Parallel => "parallel",
});

/// How the timed region is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concurrency {
    /// Every operation on the calling thread.
    Serial,
    /// Operations split across `workers` threads.
    Parallel {
        /// Number of worker threads.
        workers: NonZeroUsize,
    },
}

impl Concurrency {
    /// The concurrency axis without its worker count.
    #[must_use]
    pub const fn mode(&self) -> ConcurrencyMode {
        match self {
            Self::Serial => ConcurrencyMode::Serial,
            Self::Parallel { .. } => ConcurrencyMode::Parallel,
        }
    }

    /// Worker threads used; 1 for serial.
    #[must_use]
    pub const fn workers(&self) -> usize {
        match self {
            Self::Serial => 1,
            Self::Parallel { workers } => workers.get(),
        }
    }
}

/// One measured combination of metric kind, label mode and concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scenario {
    /// Instrument family.
    pub kind: MetricKind,
    /// Label handling.
    pub labels: LabelMode,
    /// Serial or parallel execution.
    pub concurrency: Concurrency,
}

impl Scenario {
    /// Combine the three axes.
    #[must_use]
    pub const fn new(kind: MetricKind, labels: LabelMode, concurrency: Concurrency) -> Self {
        Self { kind, labels, concurrency }
    }

    /// Stable benchmark identifier, e.g. `histogram_cached_labels_parallel`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}_{}_{}", self.kind, self.labels, self.concurrency.mode())
    }

    /// Every scenario in a stable order: counters first, then histograms;
    /// within a kind no labels, uncached, cached; serial before parallel.
    #[must_use]
    pub fn matrix(workers: NonZeroUsize) -> Vec<Self> {
        let mut scenarios = Vec::with_capacity(12);
        for kind in [MetricKind::Counter, MetricKind::Histogram] {
            for labels in [LabelMode::None, LabelMode::Uncached, LabelMode::Cached] {
                for concurrency in [Concurrency::Serial, Concurrency::Parallel { workers }] {
                    scenarios.push(Self::new(kind, labels, concurrency));
                }
            }
        }
        scenarios
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.concurrency {
            Concurrency::Serial => write!(f, "{}", self.id()),
            Concurrency::Parallel { workers } => write!(f, "{} (workers={workers})", self.id()),
        }
    }
}

//! Benchmark harness
//!
//! Every scenario follows the same shape: an untimed setup that builds a
//! [`ScenarioContext`] on a fresh backend registry, then a timed region run
//! serially or across workers, then nothing. Backends plug in through the
//! [`MetricsBackend`] port.

pub mod context;
pub mod ports;
pub mod report;
pub mod runner;

pub use context::{execute, ScenarioContext};
pub use ports::MetricsBackend;
pub use report::ScenarioReport;
pub use runner::{partition, run_parallel, run_serial};

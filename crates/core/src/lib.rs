//! # MeterBench Core
//!
//! Library-agnostic benchmark harness.
//!
//! This crate contains:
//! - The `MetricsBackend` port every metrics library adapter implements
//! - Scenario contexts (setup, timed region, done)
//! - Serial and parallel timed runners
//! - Scenario reports
//!
//! ## Architecture Principles
//! - Only depends on `meterbench-domain`
//! - No metrics library code; adapters live in `meterbench-infra`
//! - Harness code adds no allocation, logging or blocking to the timed region

pub mod harness;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use harness::{
    execute, partition, run_parallel, run_serial, MetricsBackend, ScenarioContext, ScenarioReport,
};

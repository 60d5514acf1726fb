//! # MeterBench Domain
//!
//! Domain types for the metrics instrumentation overhead benchmarks.
//!
//! This crate contains:
//! - Scenario axes (metric kind, label mode, concurrency mode)
//! - The deterministic load generator feeding every histogram benchmark
//! - Error types and Result definitions
//! - Configuration structures
//! - Label and metric name constants shared by every backend
//!
//! ## Architecture
//! - No dependencies on other MeterBench crates
//! - No dependencies on any metrics library
//! - Pure data structures and functions

pub mod config;
pub mod constants;
pub mod errors;
pub mod load;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use load::simulate_observe;
pub use types::*;

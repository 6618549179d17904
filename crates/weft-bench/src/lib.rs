//! # weft-bench
//!
//! Benchmark suite for the Weft orchestration engine.
//!
//! Provides 4 procedural scenarios, a runner that drives a
//! [`weft_sim::ClothController`] frame by frame, and CSV/JSON export of
//! the collected metrics for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};

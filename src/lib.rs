//! SYNCBENCH — null-coordination benchmark for the price-synchronization index
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod analytic;
pub mod config;
pub mod estimator;
pub mod report;
pub mod types;

pub use estimator::{estimate, estimate_with_default_seed, DEFAULT_SEED};
pub use types::{BenchmarkError, BenchmarkEstimate, DegeneratePolicy, ProbabilityVector};

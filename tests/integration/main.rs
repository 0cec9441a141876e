//! Integration tests for the SYNCBENCH library.

mod benchmark_properties;
mod degenerate_trials;
mod scenario_runs;

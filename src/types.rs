//! Shared types for the SYNCBENCH estimator.
//!
//! These types form the data model used across the estimator, the
//! analytic oracle, and the binary. Probability vectors are validated
//! once at construction so downstream code can index them freely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Probability vector
// ---------------------------------------------------------------------------

/// Per-store marginal probabilities of a price change at one time step.
///
/// Always holds at least two stores, each probability in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ProbabilityVector(Vec<f64>);

impl ProbabilityVector {
    /// Validate and wrap a list of per-store probabilities.
    pub fn new(probabilities: Vec<f64>) -> Result<Self, BenchmarkError> {
        if probabilities.len() < 2 {
            return Err(BenchmarkError::InvalidArgument(format!(
                "need at least 2 stores, got {}",
                probabilities.len()
            )));
        }
        for (store, &p) in probabilities.iter().enumerate() {
            // NaN fails the range check as well
            if !(0.0..=1.0).contains(&p) {
                return Err(BenchmarkError::InvalidArgument(format!(
                    "probability for store {store} must be in [0, 1], got {p}"
                )));
            }
        }
        Ok(Self(probabilities))
    }

    /// Wrap literals already known to be valid.
    pub(crate) fn from_trusted(probabilities: Vec<f64>) -> Self {
        debug_assert!(Self::new(probabilities.clone()).is_ok());
        Self(probabilities)
    }

    /// Number of stores.
    pub fn store_count(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Multiply every probability by `factor`, which must lie in `[0, 1]`.
    pub fn scaled(&self, factor: f64) -> Result<Self, BenchmarkError> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(BenchmarkError::InvalidArgument(format!(
                "scale factor must be in [0, 1], got {factor}"
            )));
        }
        Self::new(self.0.iter().map(|p| p * factor).collect())
    }
}

impl TryFrom<Vec<f64>> for ProbabilityVector {
    type Error = BenchmarkError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&[f64]> for ProbabilityVector {
    type Error = BenchmarkError;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        Self::new(value.to_vec())
    }
}

impl From<ProbabilityVector> for Vec<f64> {
    fn from(value: ProbabilityVector) -> Self {
        value.0
    }
}

impl fmt::Display for ProbabilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| format!("{p:.3}")).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Degenerate trial policy
// ---------------------------------------------------------------------------

/// What to do with a trial in which no store changed price at any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Leave the trial out of the outer average.
    #[default]
    Skip,
    /// Let the undefined trial mean turn the whole estimate into NaN.
    Propagate,
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegeneratePolicy::Skip => write!(f, "skip"),
            DegeneratePolicy::Propagate => write!(f, "propagate"),
        }
    }
}

impl FromStr for DegeneratePolicy {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" | "exclude" => Ok(DegeneratePolicy::Skip),
            "propagate" | "nan" => Ok(DegeneratePolicy::Propagate),
            other => Err(BenchmarkError::InvalidArgument(format!(
                "unknown degenerate policy: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Trial and run summaries
// ---------------------------------------------------------------------------

/// Summary of one repetition's index series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    /// Sum of the index over informative steps.
    pub index_sum: f64,
    /// Steps where at least one store changed price.
    pub informative_steps: usize,
    pub sample_length: usize,
}

impl TrialOutcome {
    /// Mean index over informative steps, `None` if there were none.
    pub fn conditional_mean(&self) -> Option<f64> {
        if self.informative_steps == 0 {
            None
        } else {
            Some(self.index_sum / self.informative_steps as f64)
        }
    }
}

/// Result of a full Monte Carlo run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkEstimate {
    /// Mean across trials of the per-trial conditional mean.
    pub value: f64,
    pub store_count: usize,
    pub repetitions: usize,
    pub sample_length: usize,
    pub seed: u64,
    /// Trials that contributed to `value`.
    pub trials_used: usize,
    /// Trials with zero informative steps.
    pub degenerate_trials: usize,
    pub informative_steps: usize,
    pub total_steps: usize,
}

impl BenchmarkEstimate {
    /// Share of simulated steps where at least one store changed price.
    pub fn informative_rate(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.informative_steps as f64 / self.total_steps as f64
    }

    /// Value rounded to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> f64 {
        round_to(self.value, decimals)
    }
}

impl fmt::Display for BenchmarkEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} (stores: {} | trials: {}/{} | informative: {:.1}%)",
            self.value,
            self.store_count,
            self.trials_used,
            self.repetitions,
            self.informative_rate() * 100.0,
        )
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SYNCBENCH.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BenchmarkError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No informative trials: all {repetitions} trials had zero price changes")]
    NoInformativeTrials { repetitions: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

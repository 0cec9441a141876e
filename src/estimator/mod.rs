//! Monte Carlo estimator of the null-coordination benchmark.
//!
//! Each repetition simulates independent Bernoulli price-change sequences
//! for every store, turns the per-step change counts into the
//! synchronization index, and averages it over the informative steps.
//! The benchmark is the mean of those per-trial conditional means.
//!
//! All randomness comes from one `ChaCha8Rng` stream, consumed store-major
//! (store 0's full sample, then store 1's, ...) so a given seed, store count,
//! and sample length always reproduce the same value.

pub mod parallel;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::types::{
    BenchmarkError, BenchmarkEstimate, DegeneratePolicy, ProbabilityVector, TrialOutcome,
};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 123_456;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Monte Carlo run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Number of independent trials.
    pub repetitions: usize,
    /// Time steps simulated per trial.
    pub sample_length: usize,
    pub seed: u64,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            repetitions: 1000,
            sample_length: 1000,
            seed: DEFAULT_SEED,
            degenerate_policy: DegeneratePolicy::Skip,
        }
    }
}

impl EstimatorConfig {
    /// Reject non-positive repetition or sample counts.
    pub fn validate(&self) -> Result<(), BenchmarkError> {
        if self.repetitions == 0 {
            return Err(BenchmarkError::InvalidArgument(
                "repetitions must be at least 1".into(),
            ));
        }
        if self.sample_length == 0 {
            return Err(BenchmarkError::InvalidArgument(
                "sample_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sequential estimator
// ---------------------------------------------------------------------------

pub struct MonteCarloEstimator {
    config: EstimatorConfig,
}

impl MonteCarloEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Access the run configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Run every trial from a single seeded stream.
    pub fn run(
        &self,
        probabilities: &ProbabilityVector,
    ) -> Result<BenchmarkEstimate, BenchmarkError> {
        self.config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut counts = vec![0u32; self.config.sample_length];
        let mut acc = TrialAccumulator::new(self.config.degenerate_policy);

        for trial in 0..self.config.repetitions {
            let outcome = run_trial(&mut rng, probabilities, &mut counts);
            acc.push(trial, outcome);
        }

        acc.finish(&self.config, probabilities.store_count())
    }
}

/// Estimate the benchmark value for raw per-store probabilities.
///
/// Fails with `InvalidArgument` on fewer than two stores, a probability
/// outside `[0, 1]`, or zero repetitions / sample length. Trials without
/// any price change are excluded; if every trial is such a trial the
/// result is `NoInformativeTrials`.
pub fn estimate(
    probabilities: &[f64],
    repetitions: usize,
    sample_length: usize,
    seed: u64,
) -> Result<f64, BenchmarkError> {
    let probabilities = ProbabilityVector::try_from(probabilities)?;
    let estimator = MonteCarloEstimator::new(EstimatorConfig {
        repetitions,
        sample_length,
        seed,
        degenerate_policy: DegeneratePolicy::Skip,
    });
    Ok(estimator.run(&probabilities)?.value)
}

/// [`estimate`] with [`DEFAULT_SEED`].
pub fn estimate_with_default_seed(
    probabilities: &[f64],
    repetitions: usize,
    sample_length: usize,
) -> Result<f64, BenchmarkError> {
    estimate(probabilities, repetitions, sample_length, DEFAULT_SEED)
}

// ---------------------------------------------------------------------------
// Trial simulation
// ---------------------------------------------------------------------------

/// Simulate one repetition.
///
/// `counts` is scratch space with one slot per time step; after the call
/// it holds how many stores changed price at each step. Every cell
/// consumes exactly one uniform draw, so `p = 0` never fires and `p = 1`
/// always does.
pub(crate) fn run_trial<R: Rng>(
    rng: &mut R,
    probabilities: &ProbabilityVector,
    counts: &mut [u32],
) -> TrialOutcome {
    counts.fill(0);

    for p in probabilities.iter() {
        for count in counts.iter_mut() {
            if rng.gen::<f64>() < p {
                *count += 1;
            }
        }
    }

    // Index at a step is (count - 1) / (k - 1); steps with count 0 would be
    // negative and are left out.
    let mut excess_changes: u64 = 0;
    let mut informative_steps = 0usize;
    for &count in counts.iter() {
        if count > 0 {
            excess_changes += u64::from(count - 1);
            informative_steps += 1;
        }
    }

    let stores_minus_one = (probabilities.store_count() - 1) as f64;
    TrialOutcome {
        index_sum: excess_changes as f64 / stores_minus_one,
        informative_steps,
        sample_length: counts.len(),
    }
}

/// Folds trial outcomes into a [`BenchmarkEstimate`] in trial order.
pub(crate) struct TrialAccumulator {
    policy: DegeneratePolicy,
    mean_sum: f64,
    trials_used: usize,
    degenerate_trials: usize,
    informative_steps: usize,
    total_steps: usize,
}

impl TrialAccumulator {
    pub(crate) fn new(policy: DegeneratePolicy) -> Self {
        Self {
            policy,
            mean_sum: 0.0,
            trials_used: 0,
            degenerate_trials: 0,
            informative_steps: 0,
            total_steps: 0,
        }
    }

    pub(crate) fn push(&mut self, trial: usize, outcome: TrialOutcome) {
        self.total_steps += outcome.sample_length;
        self.informative_steps += outcome.informative_steps;

        match outcome.conditional_mean() {
            Some(mean) => {
                self.mean_sum += mean;
                self.trials_used += 1;
            }
            None => {
                self.degenerate_trials += 1;
                debug!(trial, policy = %self.policy, "Trial had no price changes");
            }
        }
    }

    pub(crate) fn finish(
        self,
        config: &EstimatorConfig,
        store_count: usize,
    ) -> Result<BenchmarkEstimate, BenchmarkError> {
        let value = match self.policy {
            DegeneratePolicy::Propagate if self.degenerate_trials > 0 => {
                warn!(
                    degenerate = self.degenerate_trials,
                    repetitions = config.repetitions,
                    "Degenerate trials present, estimate is NaN"
                );
                f64::NAN
            }
            _ if self.trials_used == 0 => {
                return Err(BenchmarkError::NoInformativeTrials {
                    repetitions: config.repetitions,
                });
            }
            _ => {
                if self.degenerate_trials > 0 {
                    warn!(
                        degenerate = self.degenerate_trials,
                        used = self.trials_used,
                        "Skipped trials without price changes"
                    );
                }
                self.mean_sum / self.trials_used as f64
            }
        };

        let estimate = BenchmarkEstimate {
            value,
            store_count,
            repetitions: config.repetitions,
            sample_length: config.sample_length,
            seed: config.seed,
            trials_used: self.trials_used,
            degenerate_trials: self.degenerate_trials,
            informative_steps: self.informative_steps,
            total_steps: self.total_steps,
        };

        info!(
            value = estimate.value,
            stores = store_count,
            trials = estimate.trials_used,
            informative_rate = estimate.informative_rate(),
            "Benchmark estimated"
        );

        Ok(estimate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

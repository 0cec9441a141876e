//! Parallel Monte Carlo estimator.
//!
//! Repetitions are independent, so they run on a rayon pool. Trial `r`
//! draws from its own ChaCha stream (same seed, stream id `r`), which keeps
//! the streams non-overlapping and the result independent of thread count.
//! The value is statistically equivalent to, but not bit-identical with,
//! the sequential estimator's single-stream output.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use super::{run_trial, EstimatorConfig, TrialAccumulator};
use crate::types::{BenchmarkError, BenchmarkEstimate, ProbabilityVector, TrialOutcome};

pub struct ParallelEstimator {
    config: EstimatorConfig,
    /// Worker count; `None` uses rayon's global pool.
    threads: Option<usize>,
}

impl ParallelEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config, threads: None }
    }

    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn run(
        &self,
        probabilities: &ProbabilityVector,
    ) -> Result<BenchmarkEstimate, BenchmarkError> {
        self.config.validate()?;

        let outcomes = match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        BenchmarkError::Config(format!("failed to build thread pool: {e}"))
                    })?;
                pool.install(|| self.simulate(probabilities))
            }
            None => self.simulate(probabilities),
        };

        // Fold in trial order so the float sum does not depend on scheduling
        let mut acc = TrialAccumulator::new(self.config.degenerate_policy);
        for (trial, outcome) in outcomes.into_iter().enumerate() {
            acc.push(trial, outcome);
        }
        acc.finish(&self.config, probabilities.store_count())
    }

    fn simulate(&self, probabilities: &ProbabilityVector) -> Vec<TrialOutcome> {
        let seed = self.config.seed;
        let sample_length = self.config.sample_length;

        debug!(
            repetitions = self.config.repetitions,
            threads = rayon::current_num_threads(),
            "Simulating trials in parallel"
        );

        (0..self.config.repetitions)
            .into_par_iter()
            .map_init(
                || vec![0u32; sample_length],
                |counts, trial| {
                    let mut rng = trial_rng(seed, trial);
                    run_trial(&mut rng, probabilities, counts)
                },
            )
            .collect()
    }
}

/// Independent generator for one trial.
fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

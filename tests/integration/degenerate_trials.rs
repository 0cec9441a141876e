//! Trials in which no store changes price at any step.

use syncbench::estimator::parallel::ParallelEstimator;
use syncbench::estimator::{EstimatorConfig, MonteCarloEstimator};
use syncbench::{estimate, BenchmarkError, DegeneratePolicy, ProbabilityVector};

fn sparse_config(policy: DegeneratePolicy) -> EstimatorConfig {
    // P(no change in a trial) = 0.9801^5 ≈ 0.9, so most trials are degenerate
    EstimatorConfig {
        repetitions: 200,
        sample_length: 5,
        seed: 2024,
        degenerate_policy: policy,
    }
}

fn sparse() -> ProbabilityVector {
    ProbabilityVector::new(vec![0.01, 0.01]).unwrap()
}

#[test]
fn test_skip_excludes_degenerate_trials() {
    let est = MonteCarloEstimator::new(sparse_config(DegeneratePolicy::Skip))
        .run(&sparse())
        .unwrap();

    assert!(est.degenerate_trials > 0);
    assert!(est.trials_used > 0);
    assert_eq!(est.trials_used + est.degenerate_trials, est.repetitions);
    assert!(est.value.is_finite());
    assert!((0.0..=1.0).contains(&est.value));
}

#[test]
fn test_propagate_surfaces_nan() {
    let est = MonteCarloEstimator::new(sparse_config(DegeneratePolicy::Propagate))
        .run(&sparse())
        .unwrap();
    assert!(est.degenerate_trials > 0);
    assert!(est.value.is_nan());
}

#[test]
fn test_skip_and_propagate_agree_without_degenerate_trials() {
    let probs = ProbabilityVector::new(vec![0.5, 0.5, 0.5]).unwrap();
    let mut config = sparse_config(DegeneratePolicy::Skip);
    config.sample_length = 100;

    let skip = MonteCarloEstimator::new(config.clone()).run(&probs).unwrap();
    config.degenerate_policy = DegeneratePolicy::Propagate;
    let propagate = MonteCarloEstimator::new(config).run(&probs).unwrap();

    assert_eq!(skip.degenerate_trials, 0);
    assert_eq!(skip.value.to_bits(), propagate.value.to_bits());
}

#[test]
fn test_all_zero_probabilities_error() {
    let err = estimate(&[0.0, 0.0, 0.0], 10, 1000, 1).unwrap_err();
    assert_eq!(err, BenchmarkError::NoInformativeTrials { repetitions: 10 });
}

#[test]
fn test_parallel_skip_matches_policy() {
    let est = ParallelEstimator::new(sparse_config(DegeneratePolicy::Skip))
        .with_threads(2)
        .run(&sparse())
        .unwrap();
    assert!(est.degenerate_trials > 0);
    assert_eq!(est.trials_used + est.degenerate_trials, est.repetitions);
    assert!(est.value.is_finite());
}

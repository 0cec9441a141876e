//! Statistical properties of the estimator at the reference configuration.
//!
//! The reference runs use 1000 repetitions of 1000 steps with seed 123456,
//! so the Monte Carlo error is far below the 0.01 tolerances.

use syncbench::analytic::{conditional_expectation, three_store_expectation};
use syncbench::estimator::parallel::ParallelEstimator;
use syncbench::estimator::{EstimatorConfig, MonteCarloEstimator};
use syncbench::{estimate, BenchmarkError, ProbabilityVector, DEFAULT_SEED};

const REPETITIONS: usize = 1000;
const SAMPLE_LENGTH: usize = 1000;

#[test]
fn test_three_store_converges_to_closed_form() {
    let value = estimate(&[0.1, 0.2, 0.3], REPETITIONS, SAMPLE_LENGTH, DEFAULT_SEED).unwrap();
    let closed = three_store_expectation(0.1, 0.2, 0.3);

    assert!((value - 0.105).abs() < 0.01, "estimate {value}");
    assert!((value - closed).abs() < 0.01, "estimate {value} vs closed form {closed}");
}

#[test]
fn test_ten_equal_stores() {
    let value = estimate(&[0.1; 10], REPETITIONS, SAMPLE_LENGTH, DEFAULT_SEED).unwrap();
    assert!((value - 0.059).abs() < 0.01, "estimate {value}");

    let exact = conditional_expectation(&ProbabilityVector::new(vec![0.1; 10]).unwrap()).unwrap();
    assert!((value - exact).abs() < 0.01, "estimate {value} vs exact {exact}");
}

#[test]
fn test_repeated_calls_are_identical() {
    let a = estimate(&[0.1, 0.2, 0.3], 100, 200, DEFAULT_SEED).unwrap();
    let b = estimate(&[0.1, 0.2, 0.3], 100, 200, DEFAULT_SEED).unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn test_scaling_toward_zero_shrinks_informative_steps() {
    let base = ProbabilityVector::new(vec![0.1, 0.2, 0.3]).unwrap();
    let estimator = MonteCarloEstimator::new(EstimatorConfig {
        repetitions: 200,
        sample_length: 500,
        ..Default::default()
    });

    let mut previous_informative = usize::MAX;
    for factor in [1.0, 0.5, 0.1, 0.01] {
        let scaled = base.scaled(factor).unwrap();
        let est = estimator.run(&scaled).unwrap();

        assert!(
            est.informative_steps < previous_informative,
            "factor {factor}: {} informative steps, previous {previous_informative}",
            est.informative_steps
        );
        assert!((0.0..=1.0).contains(&est.value), "factor {factor}: value {}", est.value);
        previous_informative = est.informative_steps;
    }
}

#[test]
fn test_two_stores_index_is_binary() {
    let (a, b) = (0.3, 0.6);
    let probs = ProbabilityVector::new(vec![a, b]).unwrap();
    let est = MonteCarloEstimator::new(EstimatorConfig::default()).run(&probs).unwrap();

    // Index is 1 when both change and 0 otherwise, so the conditional mean
    // is the share of informative steps where both stores moved
    let both_given_any = a * b / (1.0 - (1.0 - a) * (1.0 - b));
    assert!((0.0..=1.0).contains(&est.value));
    assert!(
        (est.value - both_given_any).abs() < 0.01,
        "estimate {} vs {both_given_any}",
        est.value
    );
}

#[test]
fn test_certain_changes_give_full_synchronization() {
    let value = estimate(&[1.0, 1.0, 1.0, 1.0, 1.0], 10, 100, DEFAULT_SEED).unwrap();
    assert_eq!(value, 1.0);
}

#[test]
fn test_single_active_store_gives_zero() {
    let value = estimate(&[0.5, 0.0, 0.0], 10, 100, DEFAULT_SEED).unwrap();
    assert_eq!(value, 0.0);
}

#[test]
fn test_parallel_converges_to_closed_form() {
    let probs = ProbabilityVector::new(vec![0.1, 0.2, 0.3]).unwrap();
    let est = ParallelEstimator::new(EstimatorConfig::default()).run(&probs).unwrap();
    let closed = three_store_expectation(0.1, 0.2, 0.3);
    assert!((est.value - closed).abs() < 0.01, "parallel {} vs {closed}", est.value);
}

#[test]
fn test_single_store_rejected() {
    let err = estimate(&[0.5], REPETITIONS, SAMPLE_LENGTH, DEFAULT_SEED).unwrap_err();
    assert!(matches!(err, BenchmarkError::InvalidArgument(_)));
}

#[test]
fn test_out_of_range_probability_rejected() {
    let err = estimate(&[0.1, 1.5, 0.3], REPETITIONS, SAMPLE_LENGTH, DEFAULT_SEED).unwrap_err();
    assert!(matches!(err, BenchmarkError::InvalidArgument(_)));
}

#[test]
fn test_empty_vector_rejected() {
    assert!(matches!(estimate(&[], 10, 10, DEFAULT_SEED), Err(BenchmarkError::InvalidArgument(_))));
}

#[test]
fn test_zero_repetitions_rejected() {
    let err = estimate(&[0.1, 0.2], 0, 10, DEFAULT_SEED).unwrap_err();
    assert!(matches!(err, BenchmarkError::InvalidArgument(_)));
}

//! Closed-form null expectation of the price-synchronization index.
//!
//! Serves as the ground truth the Monte Carlo estimator converges to.
//! With `S` the number of stores changing price at a step and `k` the
//! store count, the index is `(S - 1) / (k - 1)`, so conditioning on
//! `S >= 1` gives
//!
//! ```text
//! E[index | S >= 1] = (E[S] - P(S >= 1)) / ((k - 1) * P(S >= 1))
//! ```
//!
//! with `E[S] = Σ p_i` and `P(S >= 1) = 1 - Π (1 - p_i)`.

use crate::types::ProbabilityVector;

/// The three-store formula written out term by term.
///
/// Half weight for exactly two simultaneous changes, full weight for all
/// three, normalised by the probability that anything changed at all.
/// Returns NaN when all three probabilities are zero.
pub fn three_store_expectation(p1: f64, p2: f64, p3: f64) -> f64 {
    let two_change = p1 * p2 * (1.0 - p3) + p1 * p3 * (1.0 - p2) + p2 * p3 * (1.0 - p1);
    let all_change = p1 * p2 * p3;
    let any_change = 1.0 - (1.0 - p1) * (1.0 - p2) * (1.0 - p3);
    (0.5 * two_change + all_change) / any_change
}

/// Probability that at least one store changes price at a given step.
pub fn informative_probability(probabilities: &ProbabilityVector) -> f64 {
    any_change(probabilities.as_slice())
}

/// `1 - Π(1 - p)`, kept accurate when every `p` is tiny.
fn any_change(probabilities: &[f64]) -> f64 {
    let log_none: f64 = probabilities.iter().map(|p| (-p).ln_1p()).sum();
    -log_none.exp_m1()
}

/// Exact conditional expectation of the index for any store count.
///
/// `E[S] - P(S >= 1)` is summed as `Σ p_i · P(some store before i changes)`,
/// which has no cancellation for small probabilities. `None` when no store
/// can ever change price.
pub fn conditional_expectation(probabilities: &ProbabilityVector) -> Option<f64> {
    let any = informative_probability(probabilities);
    if any <= 0.0 {
        return None;
    }
    let slice = probabilities.as_slice();
    let excess_changes: f64 = slice
        .iter()
        .enumerate()
        .map(|(i, p)| p * any_change(&slice[..i]))
        .sum();
    let stores_minus_one = (probabilities.store_count() - 1) as f64;
    Some(excess_changes / (stores_minus_one * any))
}

//! Scenario runs and their printable reports.
//!
//! Ties the configuration to the estimators and the analytic oracle, and
//! renders results either as plain text lines or as one JSON document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

use crate::analytic;
use crate::config::{AppConfig, ScenarioConfig};
use crate::estimator::parallel::ParallelEstimator;
use crate::estimator::MonteCarloEstimator;
use crate::types::{round_to, BenchmarkError, BenchmarkEstimate, ProbabilityVector};

/// Outcome of benchmarking one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub probabilities: ProbabilityVector,
    pub estimate: BenchmarkEstimate,
    /// Exact null expectation, if any store can change price.
    pub exact: Option<f64>,
    /// The literal three-store formula, for three-store scenarios only.
    pub three_store_closed_form: Option<f64>,
    pub parallel: bool,
}

impl ScenarioReport {
    /// Absolute gap between the estimate and the exact expectation.
    ///
    /// `None` when either side is undefined, e.g. a NaN estimate under the
    /// propagate policy.
    pub fn error(&self) -> Option<f64> {
        if !self.estimate.value.is_finite() {
            return None;
        }
        self.exact.map(|exact| (self.estimate.value - exact).abs())
    }

    /// One line of text, values rounded to `decimals` places.
    pub fn render_text(&self, decimals: u32, show_analytic: bool) -> String {
        let d = decimals as usize;
        let mut line = format!("{}: {:.*}", self.name, d, self.estimate.rounded(decimals));
        if show_analytic {
            if let Some(exact) = self.exact {
                let _ = write!(line, " (exact {:.*}", d, round_to(exact, decimals));
                if let Some(closed) = self.three_store_closed_form {
                    let _ = write!(line, ", closed-form {:.*}", d, round_to(closed, decimals));
                }
                line.push(')');
            }
        }
        line
    }
}

/// All scenario reports from one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn render_text(&self, decimals: u32, show_analytic: bool) -> String {
        self.scenarios
            .iter()
            .map(|s| s.render_text(decimals, show_analytic))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Benchmark one scenario with the configured estimator.
pub fn run_scenario(
    cfg: &AppConfig,
    scenario: &ScenarioConfig,
) -> Result<ScenarioReport, BenchmarkError> {
    let estimator_config = cfg.estimator_config();
    let probabilities = &scenario.probabilities;

    info!(
        scenario = %scenario.name,
        stores = probabilities.store_count(),
        probabilities = %probabilities,
        parallel = cfg.simulation.parallel,
        "Running scenario"
    );

    let estimate = if cfg.simulation.parallel {
        let mut estimator = ParallelEstimator::new(estimator_config);
        if let Some(threads) = cfg.simulation.threads {
            estimator = estimator.with_threads(threads);
        }
        estimator.run(probabilities)?
    } else {
        MonteCarloEstimator::new(estimator_config).run(probabilities)?
    };

    let three_store_closed_form = match probabilities.as_slice() {
        &[p1, p2, p3] if analytic::informative_probability(probabilities) > 0.0 => {
            Some(analytic::three_store_expectation(p1, p2, p3))
        }
        _ => None,
    };

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        probabilities: probabilities.clone(),
        estimate,
        exact: analytic::conditional_expectation(probabilities),
        three_store_closed_form,
        parallel: cfg.simulation.parallel,
    })
}

/// Benchmark every configured scenario in order.
pub fn run_all(cfg: &AppConfig) -> Result<RunReport, BenchmarkError> {
    let scenarios = cfg
        .scenarios
        .iter()
        .map(|scenario| run_scenario(cfg, scenario))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RunReport {
        generated_at: Utc::now(),
        scenarios,
    })
}

//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so an absent file or a partial file still
//! yields a runnable configuration with the two reference scenarios.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::estimator::{EstimatorConfig, DEFAULT_SEED};
use crate::types::{BenchmarkError, DegeneratePolicy, ProbabilityVector};

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub repetitions: usize,
    pub sample_length: usize,
    pub seed: u64,
    pub degenerate_policy: DegeneratePolicy,
    /// Run trials on a rayon pool with one RNG stream per trial.
    pub parallel: bool,
    /// Worker count for the parallel estimator; rayon's default if unset.
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repetitions: 1000,
            sample_length: 1000,
            seed: DEFAULT_SEED,
            degenerate_policy: DegeneratePolicy::Skip,
            parallel: false,
            threads: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Decimal places for printed values.
    pub decimals: u32,
    pub format: OutputFormat,
    /// Print the exact expectation next to each estimate.
    pub show_analytic: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decimals: 3,
            format: OutputFormat::Text,
            show_analytic: true,
        }
    }
}

/// One set of store probabilities to benchmark.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    pub probabilities: ProbabilityVector,
}

fn default_scenarios() -> Vec<ScenarioConfig> {
    vec![
        ScenarioConfig {
            name: "three-store".to_string(),
            probabilities: ProbabilityVector::from_trusted(vec![0.1, 0.2, 0.3]),
        },
        ScenarioConfig {
            name: "ten-store".to_string(),
            probabilities: ProbabilityVector::from_trusted(vec![0.1; 10]),
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            output: OutputConfig::default(),
            scenarios: default_scenarios(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using built-in scenarios");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Resolve the command-line config argument.
    ///
    /// An explicit path must exist and parse. Without one, `config.toml` is
    /// read if present and the built-in scenarios are used otherwise.
    pub fn load_from_arg(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), BenchmarkError> {
        self.estimator_config().validate()?;
        if self.scenarios.is_empty() {
            return Err(BenchmarkError::Config("at least one scenario is required".into()));
        }
        if let Some(0) = self.simulation.threads {
            return Err(BenchmarkError::Config("threads must be at least 1".into()));
        }
        if self.output.decimals > 15 {
            return Err(BenchmarkError::Config(format!(
                "decimals must be at most 15, got {}",
                self.output.decimals
            )));
        }
        Ok(())
    }

    /// Estimator parameters from the `[simulation]` section.
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            repetitions: self.simulation.repetitions,
            sample_length: self.simulation.sample_length,
            seed: self.simulation.seed,
            degenerate_policy: self.simulation.degenerate_policy,
        }
    }
}

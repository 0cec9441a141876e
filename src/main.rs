//! SYNCBENCH — null-coordination benchmark for the price-synchronization index
//!
//! Entry point. Loads configuration, initialises structured logging,
//! estimates the benchmark for every configured scenario, and prints
//! the rounded results to stdout.

use anyhow::{Context, Result};
use tracing::info;

use syncbench::config::{self, OutputFormat};
use syncbench::report;

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    // Config path may be given as the first argument
    let path = std::env::args().nth(1);
    let cfg = config::AppConfig::load_from_arg(path.as_deref())?;

    info!(
        scenarios = cfg.scenarios.len(),
        repetitions = cfg.simulation.repetitions,
        sample_length = cfg.simulation.sample_length,
        seed = cfg.simulation.seed,
        policy = %cfg.simulation.degenerate_policy,
        format = %cfg.output.format,
        "SYNCBENCH starting"
    );

    let run = report::run_all(&cfg).context("Benchmark run failed")?;

    match cfg.output.format {
        OutputFormat::Text => {
            println!("{}", run.render_text(cfg.output.decimals, cfg.output.show_analytic));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&run).context("Failed to serialise report")?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout
/// carries only the results.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("syncbench=info"));

    let json_logging = std::env::var("SYNCBENCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

//! Crypt engine binary.
//!
//! Runs each configured proliferation model over a stand-in crypt and
//! prints a JSON report of divisions, fate counts and parameters.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `crypt-config.yaml`
//! 2. Initialize structured logging (tracing) from the `logging` section
//! 3. Apply parameter overwrites to the restricted crypt environment
//! 4. Run every configured model from the same seed
//! 5. Print the report to stdout

mod error;
mod progress;

use std::path::Path;

use crypt_core::config::{CryptConfig, LoggingSection};
use crypt_core::parameters::ParameterEnvironment;
use crypt_core::runner::{self, RunSummary};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::{ProgressCallback, RunPeaks};

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "crypt-config.yaml";

/// One model's entry in the printed report.
#[derive(Debug, Serialize)]
struct ModelReport {
    display_name: &'static str,
    #[serde(flatten)]
    summary: RunSummary,
    peaks: RunPeaks,
    /// Rows of `[time, x, y, parent_age]`.
    division_table: Vec<[f64; 4]>,
}

/// Application entry point for the crypt engine.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any model run
/// fails. A failing run stops the whole sweep.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("crypt-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        seed = config.simulation.seed,
        models = config.simulation.models.len(),
        overwrites = config.parameters.len(),
        "Configuration loaded"
    );

    // 3. Build the parameter environment.
    let mut env = ParameterEnvironment::default();
    env.overwrite_all(&config.parameters)
        .map_err(EngineError::from)?;
    info!(
        end_time = env.number("end_time").map_err(EngineError::from)?,
        dt_divisor = env.number("dt_divisor").map_err(EngineError::from)?,
        "Crypt parameters ready"
    );

    // 4. Run each model.
    let mut reports = Vec::with_capacity(config.simulation.models.len());
    for &kind in &config.simulation.models {
        let mut callback = ProgressCallback::new();
        let (summary, population) =
            runner::run_model(kind, &config, &env, &mut callback).map_err(EngineError::from)?;
        info!(
            model = %kind,
            divisions = summary.divisions,
            peak_cells = callback.peaks().peak_cells,
            "Model finished"
        );
        reports.push(ModelReport {
            display_name: kind.display_name(),
            summary,
            peaks: callback.peaks(),
            division_table: population.division_table(),
        });
    }

    // 5. Print the report.
    let json = serde_json::to_string_pretty(&reports).map_err(EngineError::from)?;
    println!("{json}");

    info!(models = reports.len(), "crypt-engine shutdown complete");
    Ok(())
}

/// Load the run configuration from `crypt-config.yaml`.
///
/// Returns the configuration and whether it came from the file. A missing
/// file yields the defaults.
fn load_config() -> Result<(CryptConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((CryptConfig::from_file(config_path)?, true))
    } else {
        Ok((CryptConfig::default(), false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

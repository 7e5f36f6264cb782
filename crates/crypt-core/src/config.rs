//! Configuration loading and typed config structures for crypt runs.
//!
//! The canonical configuration lives in `crypt-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! reproduces the standard four-model crypt study.

use std::collections::BTreeMap;
use std::path::Path;

use crypt_types::ModelKind;
use serde::Deserialize;

use crate::parameters::ParamValue;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration.
///
/// Mirrors the structure of `crypt-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CryptConfig {
    /// Seed and model selection.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Overwrites applied to the restricted parameter environment.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,

    /// Phase lengths and policy parameters for the crypt presets.
    #[serde(default)]
    pub cycle: CycleSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl CryptConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Seed and model selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSection {
    /// Seed for the shared random stream. Every model run reseeds with it.
    #[serde(default)]
    pub seed: u64,

    /// Models to run, in order.
    #[serde(default = "default_models")]
    pub models: Vec<ModelKind>,

    /// Log a population summary every this many hours of simulated time.
    #[serde(default = "default_report_interval_hours")]
    pub report_interval_hours: u32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: 0,
            models: default_models(),
            report_interval_hours: default_report_interval_hours(),
        }
    }
}

/// Cell-cycle parameters shared by the crypt presets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CycleSection {
    /// Mean G1 duration for stem cells.
    #[serde(default = "default_stem_g1_mean")]
    pub stem_g1_mean: f64,

    /// Mean G1 duration for transit cells.
    #[serde(default = "default_transit_g1_mean")]
    pub transit_g1_mean: f64,

    /// S phase duration.
    #[serde(default = "default_s_duration")]
    pub s_duration: f64,

    /// G2 phase duration.
    #[serde(default = "default_g2_duration")]
    pub g2_duration: f64,

    /// M phase duration.
    #[serde(default = "default_m_duration")]
    pub m_duration: f64,

    /// Floor on sampled G1 durations.
    #[serde(default = "default_minimum_gap_duration")]
    pub minimum_gap_duration: f64,

    /// Morphogen level a wild-type cell needs to keep dividing.
    #[serde(default = "default_transit_threshold")]
    pub transit_threshold: f64,

    /// Divisions a transit lineage may undergo before differentiating.
    #[serde(default = "default_max_transit_generations")]
    pub max_transit_generations: u32,

    /// Fraction of the equilibrium volume below which a G1 cell stalls.
    #[serde(default = "default_quiescent_volume_fraction")]
    pub quiescent_volume_fraction: f64,

    /// Equilibrium volume of a G1 cell.
    #[serde(default = "default_equilibrium_volume")]
    pub equilibrium_volume: f64,
}

impl Default for CycleSection {
    fn default() -> Self {
        Self {
            stem_g1_mean: default_stem_g1_mean(),
            transit_g1_mean: default_transit_g1_mean(),
            s_duration: default_s_duration(),
            g2_duration: default_g2_duration(),
            m_duration: default_m_duration(),
            minimum_gap_duration: default_minimum_gap_duration(),
            transit_threshold: default_transit_threshold(),
            max_transit_generations: default_max_transit_generations(),
            quiescent_volume_fraction: default_quiescent_volume_fraction(),
            equilibrium_volume: default_equilibrium_volume(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_models() -> Vec<ModelKind> {
    ModelKind::ALL.to_vec()
}

const fn default_report_interval_hours() -> u32 {
    10
}

const fn default_stem_g1_mean() -> f64 {
    14.0
}

const fn default_transit_g1_mean() -> f64 {
    2.0
}

const fn default_s_duration() -> f64 {
    4.0
}

const fn default_g2_duration() -> f64 {
    2.0
}

const fn default_m_duration() -> f64 {
    4.0
}

const fn default_minimum_gap_duration() -> f64 {
    0.01
}

const fn default_transit_threshold() -> f64 {
    0.5
}

const fn default_max_transit_generations() -> u32 {
    4
}

const fn default_quiescent_volume_fraction() -> f64 {
    0.8
}

const fn default_equilibrium_volume() -> f64 {
    0.866
}

fn default_log_level() -> String {
    "info".to_owned()
}

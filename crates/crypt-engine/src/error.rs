//! Error types for the crypt engine binary.

/// Top-level error for the crypt engine binary.
///
/// Each variant wraps a specific subsystem error so that `main` can
/// propagate any of them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crypt_core::config::ConfigError,
    },

    /// A configured parameter overwrite was rejected.
    #[error("parameter error: {source}")]
    Parameter {
        /// The underlying parameter error.
        #[from]
        source: crypt_core::parameters::ParameterError,
    },

    /// A model run failed.
    #[error("run error: {source}")]
    Run {
        /// The underlying population error.
        #[from]
        source: crypt_core::population::PopulationError,
    },

    /// The run report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

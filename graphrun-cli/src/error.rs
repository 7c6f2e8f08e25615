//! Error types for the graphrun CLI.

use crate::config::ConfigError;

/// Errors that end the CLI run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The config file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A call to the service failed.
    #[error(transparent)]
    Client(#[from] graphrun::Error),

    /// A record could not be rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

//! Configuration for the graphrun CLI.
//!
//! Settings are layered, highest priority first:
//! 1. Command-line flags
//! 2. Environment variables
//! 3. Config file (`~/.graphrun/config.toml`)
//! 4. Default values

use std::path::{Path, PathBuf};

use graphrun::{ClientConfig, GraphConfig, ModelName, RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Graph used when none is configured.
pub const DEFAULT_GRAPH_ID: &str = "agent";

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Service URL.
    pub api_url: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Graph the assistant is bound to.
    pub graph_id: Option<String>,
    /// Model selected through `configurable.model_name`.
    pub model_name: Option<String>,
    /// Printed event payloads are cut after this many characters.
    pub max_event_chars: Option<usize>,
    /// Retry policy.
    pub retry: Option<RetryConfig>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub graph_id: Option<String>,
    pub model_name: Option<String>,
    pub max_event_chars: Option<usize>,
}

impl CliConfig {
    /// Layers `overrides` on top of the file values.
    #[must_use]
    pub fn apply(self, overrides: Overrides) -> Self {
        let retry = match (overrides.max_attempts, self.retry) {
            (Some(attempts), Some(retry)) => Some(RetryConfig {
                max_attempts: attempts.max(1),
                ..retry
            }),
            (Some(attempts), None) => Some(RetryConfig::new(attempts)),
            (None, retry) => retry,
        };

        Self {
            api_url: overrides.api_url.or(self.api_url),
            api_key: overrides.api_key.or(self.api_key),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            graph_id: overrides.graph_id.or(self.graph_id),
            model_name: overrides.model_name.or(self.model_name),
            max_event_chars: overrides.max_event_chars.or(self.max_event_chars),
            retry,
        }
    }

    /// Builds the client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(secs);
        }
        if let Some(retry) = self.retry {
            config = config.with_retry(retry);
        }
        config
    }

    /// The graph to bind the assistant to.
    #[must_use]
    pub fn graph_id(&self) -> &str {
        self.graph_id.as_deref().unwrap_or(DEFAULT_GRAPH_ID)
    }

    /// The assistant configuration. Without a model the key is left out.
    #[must_use]
    pub fn graph_config(&self) -> GraphConfig {
        match self.model_name.as_deref() {
            Some(model) if !model.is_empty() => GraphConfig::new().with_model(ModelName::from(model)),
            _ => GraphConfig::new(),
        }
    }
}

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".graphrun")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load the config file.
///
/// An explicitly given file must exist; a missing default file yields the
/// defaults.
pub async fn load_config(explicit: Option<&Path>) -> ConfigResult<CliConfig> {
    match explicit {
        Some(path) => read_config(path).await,
        None => load_config_from(&config_path()).await,
    }
}

/// Load configuration from a specific path, falling back to defaults when
/// the file does not exist.
pub async fn load_config_from(path: &Path) -> ConfigResult<CliConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(CliConfig::default());
    }
    read_config(path).await
}

async fn read_config(path: &Path) -> ConfigResult<CliConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let config: CliConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

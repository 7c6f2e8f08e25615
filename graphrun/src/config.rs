//! Client configuration.

use std::collections::BTreeMap;

use url::Url;

use crate::error::ConfigError;
use crate::retry::RetryConfig;

/// Configuration for [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the service.
    pub api_url: String,
    /// Optional API key, sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Request timeout in seconds. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Retry policy for unary requests and stream opening.
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Default service URL (a locally served graph API).
    pub const DEFAULT_API_URL: &'static str = "http://localhost:8123";

    /// Environment variable holding the service URL.
    pub const ENV_API_URL: &'static str = "GRAPHRUN_API_URL";
    /// Environment variable holding the API key.
    pub const ENV_API_KEY: &'static str = "GRAPHRUN_API_KEY";
    /// Environment variable holding the timeout in seconds.
    pub const ENV_TIMEOUT_SECS: &'static str = "GRAPHRUN_TIMEOUT_SECS";
    /// Environment variable holding the maximum number of attempts.
    pub const ENV_MAX_RETRIES: &'static str = "GRAPHRUN_MAX_RETRIES";

    /// Creates a configuration for the given service URL.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `GRAPHRUN_API_URL` - Optional service URL
    /// - `GRAPHRUN_API_KEY` - Optional API key
    /// - `GRAPHRUN_TIMEOUT_SECS` - Optional request timeout
    /// - `GRAPHRUN_MAX_RETRIES` - Optional number of attempts
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(Self::ENV_API_URL).filter(|v| !v.is_empty()) {
            config.api_url = url;
        }
        config.api_key = lookup(Self::ENV_API_KEY).filter(|v| !v.is_empty());

        if let Some(raw) = lookup(Self::ENV_TIMEOUT_SECS) {
            config.timeout_secs = Some(parse_env(Self::ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = lookup(Self::ENV_MAX_RETRIES) {
            config.retry = RetryConfig::new(parse_env(Self::ENV_MAX_RETRIES, &raw)?);
        }

        Ok(config)
    }

    /// Sets the service URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Parses and validates the service URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let parsed = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }

        Ok(parsed)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_owned(),
            api_key: None,
            timeout_secs: None,
            headers: BTreeMap::new(),
            retry: RetryConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_owned(),
        value: raw.to_owned(),
    })
}

//! Client for the graph-agent service.
//!
//! [`Client`] holds one connection pool and the resolved configuration. The
//! three calls of the typical flow are available directly on it:
//!
//! ```rust,ignore
//! let client = Client::from_env()?;
//! let assistant = client
//!     .create_assistant("agent", GraphConfig::new().with_model("openai"))
//!     .await?;
//! let thread = client.create_thread().await?;
//! let mut stream = client
//!     .stream_run(&thread.thread_id, &assistant.assistant_id, RunInput::user("who made you?"))
//!     .await?;
//! while let Some(event) = stream.next_event().await {
//!     let event = event?;
//!     println!("{}: {}", event.event, event.data);
//! }
//! ```
//!
//! The full resource APIs live on [`Client::assistants`], [`Client::threads`]
//! and [`Client::runs`].

mod assistants;
mod http;
mod runs;
mod threads;

pub use assistants::Assistants;
pub use runs::Runs;
pub use threads::Threads;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::assistant::{Assistant, AssistantCreate, GraphConfig};
use crate::config::ClientConfig;
use crate::error::{ConfigError, Result};
use crate::retry::RetryConfig;
use crate::run::{RunCreate, RunInput};
use crate::stream::RunStream;
use crate::thread::{Thread, ThreadCreate};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client for a graph-agent service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryConfig,
    /// Bounds unary calls and the opening of run streams, never a stream body.
    timeout: Option<Duration>,
}

impl Client {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(API_KEY_HEADER, header_value(API_KEY_HEADER, key)?);
        }
        for (name, value) in &config.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
            headers.insert(header, header_value(name, value)?);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        tracing::debug!(
            url = %base_url,
            timeout_secs = ?config.timeout_secs,
            max_attempts = config.retry.max_attempts,
            "graph client created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                retry: config.retry,
                timeout: config.timeout_secs.map(Duration::from_secs),
            }),
        })
    }

    /// Create a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Get the retry policy.
    #[must_use]
    pub fn retry(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Assistant operations.
    #[must_use]
    pub const fn assistants(&self) -> Assistants<'_> {
        Assistants::new(self)
    }

    /// Thread operations.
    #[must_use]
    pub const fn threads(&self) -> Threads<'_> {
        Threads::new(self)
    }

    /// Run operations.
    #[must_use]
    pub const fn runs(&self) -> Runs<'_> {
        Runs::new(self)
    }

    /// Create an assistant bound to `graph_id` with the given configuration.
    ///
    /// The returned record carries the configuration as stored by the
    /// service. Nothing is added to `config` locally: when no model is
    /// selected the request carries none and the graph applies its own
    /// default.
    pub async fn create_assistant(
        &self,
        graph_id: impl Into<String>,
        config: GraphConfig,
    ) -> Result<Assistant> {
        self.assistants()
            .create(&AssistantCreate::new(graph_id).config(config))
            .await
    }

    /// Create a new, empty thread.
    pub async fn create_thread(&self) -> Result<Thread> {
        self.threads().create(&ThreadCreate::new()).await
    }

    /// Start a run of `assistant_id` in `thread_id` and stream its events.
    ///
    /// Fails with a request error if the run cannot be started; errors after
    /// that are reported through the returned [`RunStream`].
    pub async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        input: RunInput,
    ) -> Result<RunStream> {
        self.runs()
            .stream(thread_id, &RunCreate::new(assistant_id).input(input))
            .await
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.to_owned()))?;
    if name.eq_ignore_ascii_case(API_KEY_HEADER) {
        value.set_sensitive(true);
    }
    Ok(value)
}

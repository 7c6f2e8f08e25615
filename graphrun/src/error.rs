//! Unified error types for the graphrun client.
//!
//! Failures are split by *when* they happen:
//! - [`RequestError`] - a request failed before any run event was delivered
//!   (provisioning calls, lookups, opening a run stream)
//! - [`StreamError`] - a run stream failed after it started producing events
//! - [`ConfigError`] - the client could not be configured

/// Result type alias for graphrun operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the graphrun client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A remote request failed before streaming began.
    #[error("remote request failed: {0}")]
    Request(#[from] RequestError),

    /// A run stream terminated with an error.
    #[error("run stream failed: {0}")]
    Stream(#[from] StreamError),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization error while building a request.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the request error, if this is one.
    #[must_use]
    pub const fn as_request(&self) -> Option<&RequestError> {
        match self {
            Self::Request(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the stream error, if this is one.
    #[must_use]
    pub const fn as_stream(&self) -> Option<&StreamError> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure of a single request/response exchange with the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    /// The service could not be reached.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// The configured client timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("expected {expected}, got: {message}")]
    Decode {
        /// What the client expected to read.
        expected: String,
        /// Decoder message.
        message: String,
    },
}

impl RequestError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(expected: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            expected: expected.into(),
            message: message.into(),
        }
    }

    /// Build a status error from a raw error body.
    ///
    /// The service reports errors as `{"detail": ...}` or `{"message": ...}`;
    /// anything else is kept verbatim.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["detail", "message", "error"]
                    .iter()
                    .find_map(|key| value.get(*key).cloned())
            })
            .map_or_else(
                || body.trim().to_owned(),
                |value| match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
            );

        Self::status(status, message)
    }

    /// Returns the HTTP status, if the service answered.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout => true,
            Self::Status { status, .. } => matches!(*status, 429 | 502 | 503 | 504),
            Self::Decode { .. } => false,
        }
    }

    /// Check if the service reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::decode("response body", err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Failure of a run stream after it started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The service emitted an `error` event.
    #[error("{error}: {message}")]
    Server {
        /// Error class reported by the service.
        error: String,
        /// Error description.
        message: String,
    },

    /// Reading the response body failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not a valid event stream.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl StreamError {
    /// Create a server error.
    #[must_use]
    pub fn server(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Build a server error from an `error` event payload.
    ///
    /// Payloads look like `{"error": "ValueError", "message": "..."}`, but a
    /// bare string is accepted too.
    #[must_use]
    pub fn from_event_data(data: &serde_json::Value) -> Self {
        match data {
            serde_json::Value::Object(map) => {
                let text = |key: &str| map.get(key).and_then(|v| v.as_str()).map(str::to_owned);
                Self::server(
                    text("error").unwrap_or_else(|| "Error".to_owned()),
                    text("message").unwrap_or_else(|| data.to_string()),
                )
            }
            serde_json::Value::String(s) => Self::server("Error", s.clone()),
            other => Self::server("Error", other.to_string()),
        }
    }
}

/// Error raised while building a client configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The API URL could not be parsed.
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A header name or value was rejected.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_prefers_detail() {
        let err = RequestError::from_body(404, r#"{"detail":"Graph 'nope' not found"}"#);
        assert_eq!(err, RequestError::status(404, "Graph 'nope' not found"));
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_body_keeps_raw_text() {
        let err = RequestError::from_body(502, "  bad gateway \n");
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().ends_with("bad gateway"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_body_structured_detail() {
        let err = RequestError::from_body(422, r#"{"detail":[{"loc":["graph_id"]}]}"#);
        let RequestError::Status { message, .. } = err else {
            panic!("expected status error");
        };
        assert!(message.contains("graph_id"));
    }

    #[test]
    fn test_retryable_classes() {
        assert!(RequestError::Timeout.is_retryable());
        assert!(RequestError::Unreachable("refused".into()).is_retryable());
        assert!(RequestError::status(429, "slow down").is_retryable());
        assert!(!RequestError::status(400, "bad").is_retryable());
        assert!(!RequestError::decode("assistant", "eof").is_retryable());
    }

    #[test]
    fn test_stream_error_from_event() {
        let err = StreamError::from_event_data(&json!({
            "error": "GraphRecursionError",
            "message": "Recursion limit of 25 reached"
        }));
        assert_eq!(
            err,
            StreamError::server("GraphRecursionError", "Recursion limit of 25 reached")
        );

        let err = StreamError::from_event_data(&json!("boom"));
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_error_accessors() {
        let err: Error = RequestError::Timeout.into();
        assert!(err.as_request().is_some());
        assert!(err.as_stream().is_none());
        assert_eq!(err.to_string(), "remote request failed: request timed out");
    }
}

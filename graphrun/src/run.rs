//! Runs: executions of an assistant within a thread.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assistant::GraphConfig;
use crate::message::InputMessage;

/// Projection of graph execution emitted while streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Full state after every step.
    Values,
    /// Model messages, token by token.
    Messages,
    /// Per-node state updates.
    Updates,
    /// Internal execution events.
    Events,
    /// Debug traces of every step.
    Debug,
    /// Data emitted by graph nodes.
    Custom,
}

impl StreamMode {
    /// Get the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Values => "values",
            Self::Messages => "messages",
            Self::Updates => "updates",
            Self::Events => "events",
            Self::Debug => "debug",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StreamMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "values" => Ok(Self::Values),
            "messages" => Ok(Self::Messages),
            "updates" => Ok(Self::Updates),
            "events" => Ok(Self::Events),
            "debug" => Ok(Self::Debug),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown stream mode '{other}'")),
        }
    }
}

/// How the service treats a new run on a thread that is already busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultitaskStrategy {
    /// Refuse the new run.
    Reject,
    /// Interrupt the active run and keep its progress.
    Interrupt,
    /// Cancel the active run and discard its progress.
    Rollback,
    /// Queue the new run.
    Enqueue,
}

/// Status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// Waiting to start.
    Pending,
    /// Executing.
    Running,
    /// Finished successfully.
    Success,
    /// Failed.
    Error,
    /// Exceeded its time budget.
    Timeout,
    /// Stopped at an interrupt.
    Interrupted,
    /// A status this client does not know.
    Other(String),
}

impl RunStatus {
    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Interrupted => "interrupted",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` once the run can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Error | Self::Timeout | Self::Interrupted
        )
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "error" => Self::Error,
            "timeout" => Self::Timeout,
            "interrupted" => Self::Interrupted,
            _ => Self::Other(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

/// A run record, owned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Server-assigned identifier.
    pub run_id: String,
    /// Thread the run executes in.
    pub thread_id: String,
    /// Assistant being run.
    pub assistant_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Strategy applied when the run was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multitask_strategy: Option<MultitaskStrategy>,
    /// Creation timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Graph input for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    /// Messages appended to the thread's conversation.
    #[serde(default)]
    pub messages: Vec<InputMessage>,
    /// Other state keys the graph accepts.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunInput {
    /// Input made of the given messages.
    #[must_use]
    pub fn messages(messages: impl IntoIterator<Item = InputMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            extra: Map::new(),
        }
    }

    /// Input made of a single user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::messages([InputMessage::user(content)])
    }

    /// Appends a message.
    #[must_use]
    pub fn with_message(mut self, message: InputMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets another state key.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Request body for creating or streaming a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunCreate {
    /// Assistant to run.
    pub assistant_id: String,
    /// Graph input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<RunInput>,
    /// Requested stream projections; the service default applies when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stream_mode: Vec<StreamMode>,
    /// Per-run configuration, merged over the assistant's by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GraphConfig>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Behaviour when the thread is busy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multitask_strategy: Option<MultitaskStrategy>,
}

impl RunCreate {
    /// Creates a request for the given assistant.
    #[must_use]
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            input: None,
            stream_mode: Vec::new(),
            config: None,
            metadata: Map::new(),
            multitask_strategy: None,
        }
    }

    /// Sets the input.
    #[must_use]
    pub fn input(mut self, input: RunInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Adds a stream mode.
    #[must_use]
    pub fn stream_mode(mut self, mode: StreamMode) -> Self {
        if !self.stream_mode.contains(&mode) {
            self.stream_mode.push(mode);
        }
        self
    }

    /// Sets a per-run configuration.
    #[must_use]
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the multitask strategy.
    #[must_use]
    pub const fn multitask_strategy(mut self, strategy: MultitaskStrategy) -> Self {
        self.multitask_strategy = Some(strategy);
        self
    }
}

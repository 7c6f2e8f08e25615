//! Threads: server-owned execution contexts that accumulate run state.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assistant::OnConflict;

/// Status of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThreadStatus {
    /// No run is active.
    Idle,
    /// A run is active.
    Busy,
    /// The last run stopped at an interrupt.
    Interrupted,
    /// The last run failed.
    Error,
    /// A status this client does not know.
    Other(String),
}

impl ThreadStatus {
    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Interrupted => "interrupted",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ThreadStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "idle" => Self::Idle,
            "busy" => Self::Busy,
            "interrupted" => Self::Interrupted,
            "error" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<ThreadStatus> for String {
    fn from(status: ThreadStatus) -> Self {
        match status {
            ThreadStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conversation/execution context, owned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Server-assigned identifier.
    pub thread_id: String,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ThreadStatus>,
    /// Latest state values.
    #[serde(default)]
    pub values: Value,
    /// Creation timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for creating a thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThreadCreate {
    /// Explicit identifier; the service generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Conflict handling for an explicit `thread_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_exists: Option<OnConflict>,
}

impl ThreadCreate {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit identifier.
    #[must_use]
    pub fn thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = Some(id.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the conflict handling.
    #[must_use]
    pub const fn if_exists(mut self, on_conflict: OnConflict) -> Self {
        self.if_exists = Some(on_conflict);
        self
    }
}

/// Snapshot of a thread's graph state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    /// State values, e.g. `{"messages": [...]}`.
    #[serde(default)]
    pub values: Value,
    /// Nodes scheduled to run next; empty when the graph finished.
    #[serde(default)]
    pub next: Vec<String>,
    /// Checkpoint the snapshot was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Value>,
    /// Checkpoint metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Checkpoint timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ThreadState {
    /// The `messages` list of the state, if present.
    #[must_use]
    pub fn messages(&self) -> &[Value] {
        self.values
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` if the graph has nothing left to run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next.is_empty()
    }
}

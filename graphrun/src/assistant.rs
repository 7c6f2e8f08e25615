//! Assistants: configured instances of a server-side graph.
//!
//! The configuration an assistant is created with is interpreted entirely by
//! the graph. [`GraphConfig`] types the options the demonstration graph
//! understands and passes everything else through untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Model provider selected through `configurable.model_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelName {
    /// `"anthropic"`.
    Anthropic,
    /// `"openai"`.
    OpenAI,
    /// Any other provider name, passed through verbatim.
    Other(String),
}

impl ModelName {
    /// Provider the graph falls back to when no `model_name` is configured.
    ///
    /// Applied on the server only; the client never writes it into a config.
    pub const SERVER_DEFAULT: Self = Self::Anthropic;

    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ModelName {
    fn from(name: &str) -> Self {
        match name {
            "anthropic" => Self::Anthropic,
            "openai" => Self::OpenAI,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ModelName {
    fn from(name: String) -> Self {
        match name.as_str() {
            "anthropic" | "openai" => Self::from(name.as_str()),
            _ => Self::Other(name),
        }
    }
}

impl FromStr for ModelName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for ModelName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The `configurable` section of a graph configuration.
///
/// A `model_name` that is not a string is kept in `extra` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Configurable {
    /// Which model provider the graph should call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<ModelName>,
    /// Keys the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Configurable {
    fn from(mut extra: Map<String, Value>) -> Self {
        let model_name = match extra.remove("model_name") {
            Some(Value::String(name)) => Some(ModelName::from(name)),
            Some(other) => {
                extra.insert("model_name".to_owned(), other);
                None
            }
            None => None,
        };
        Self { model_name, extra }
    }
}

impl Configurable {
    /// Returns `true` if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model_name.is_none() && self.extra.is_empty()
    }
}

/// Configuration attached to an assistant or a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Options read by graph nodes. `None` when the section is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<Configurable>,
    /// Tags attached to traces of the graph. `None` when the list is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Maximum number of graph steps per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_limit: Option<u32>,
    /// Top-level keys the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the model provider.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelName>) -> Self {
        let configurable = self.configurable.get_or_insert_with(Configurable::default);
        configurable.extra.remove("model_name");
        configurable.model_name = Some(model.into());
        self
    }

    /// Sets an arbitrary `configurable` option.
    #[must_use]
    pub fn with_configurable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        let configurable = self.configurable.get_or_insert_with(Configurable::default);
        if key == "model_name" {
            configurable.model_name = None;
            if let Value::String(name) = &value {
                configurable.extra.remove("model_name");
                configurable.model_name = Some(ModelName::from(name.as_str()));
                return self;
            }
        }
        configurable.extra.insert(key, value);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Sets the recursion limit.
    #[must_use]
    pub const fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// The configured model provider, if any.
    #[must_use]
    pub fn model_name(&self) -> Option<&ModelName> {
        self.configurable
            .as_ref()
            .and_then(|configurable| configurable.model_name.as_ref())
    }

    /// The provider the server will use for this configuration.
    #[must_use]
    pub fn effective_model(&self) -> ModelName {
        self.model_name()
            .cloned()
            .unwrap_or(ModelName::SERVER_DEFAULT)
    }
}

/// What the service does when a resource with the requested id exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
    /// Fail the request.
    Raise,
    /// Return the existing resource.
    DoNothing,
}

/// A configured instance of a graph, owned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    /// Server-assigned identifier.
    pub assistant_id: String,
    /// Graph this assistant runs.
    pub graph_id: String,
    /// Configuration stored with the assistant.
    #[serde(default)]
    pub config: GraphConfig,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version number, bumped on every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Creation timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for creating an assistant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantCreate {
    /// Graph to bind the assistant to.
    pub graph_id: String,
    /// Configuration to store.
    pub config: GraphConfig,
    /// Explicit identifier; the service generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Conflict handling for an explicit `assistant_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_exists: Option<OnConflict>,
}

impl AssistantCreate {
    /// Creates a request for the given graph.
    #[must_use]
    pub fn new(graph_id: impl Into<String>) -> Self {
        Self {
            graph_id: graph_id.into(),
            config: GraphConfig::default(),
            assistant_id: None,
            metadata: Map::new(),
            name: None,
            if_exists: None,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets an explicit identifier.
    #[must_use]
    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = Some(id.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the conflict handling.
    #[must_use]
    pub const fn if_exists(mut self, on_conflict: OnConflict) -> Self {
        self.if_exists = Some(on_conflict);
        self
    }
}

/// Request body for searching assistants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantSearch {
    /// Only assistants of this graph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
    /// Only assistants whose metadata contains these entries.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Page size.
    pub limit: u32,
    /// Page offset.
    pub offset: u32,
}

impl AssistantSearch {
    /// Creates a search matching every assistant.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the search to one graph.
    #[must_use]
    pub fn graph_id(mut self, graph_id: impl Into<String>) -> Self {
        self.graph_id = Some(graph_id.into());
        self
    }

    /// Requires a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the page.
    #[must_use]
    pub const fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

impl Default for AssistantSearch {
    fn default() -> Self {
        Self {
            graph_id: None,
            metadata: Map::new(),
            limit: 10,
            offset: 0,
        }
    }
}

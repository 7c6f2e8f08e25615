//! Conversational messages sent as run input.
//!
//! The demonstration graph keeps a `messages` list in its state. Input
//! messages use the compact `{role, content}` form the service accepts;
//! messages coming back from the service are serialized graph messages and are
//! inspected as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
    /// Tool response message.
    Tool,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl InputMessage {
    /// Create a message with an explicit role.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Returns `true` if a serialized message was produced by a model.
///
/// Graph messages carry a `type` of `ai` (or `AIMessageChunk` while
/// streaming); plain chat messages use `role: assistant`.
#[must_use]
pub fn is_ai_message(message: &Value) -> bool {
    let kind = message.get("type").and_then(Value::as_str);
    let role = message.get("role").and_then(Value::as_str);
    matches!(kind, Some("ai" | "AIMessageChunk" | "AIMessage")) || role == Some("assistant")
}

/// Extracts the text of a serialized message.
///
/// Content is either a string or a list of parts, of which the `text` parts
/// are concatenated.
#[must_use]
pub fn message_text(message: &Value) -> Option<String> {
    match message.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.as_str()),
                    other => other.get("text").and_then(Value::as_str),
                })
                .collect();
            Some(text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_serialization() {
        let msg = InputMessage::user("who made you?");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "who made you?"})
        );
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            let encoded = serde_json::to_value(role).unwrap();
            assert_eq!(encoded, json!(role.as_str()));
            let decoded: Role = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, role);
        }
    }

    #[test]
    fn test_is_ai_message() {
        assert!(is_ai_message(&json!({"type": "ai", "content": "hi"})));
        assert!(is_ai_message(&json!({"type": "AIMessageChunk", "content": "h"})));
        assert!(is_ai_message(&json!({"role": "assistant", "content": "hi"})));
        assert!(!is_ai_message(&json!({"type": "human", "content": "hi"})));
        assert!(!is_ai_message(&json!("ai")));
    }

    #[test]
    fn test_message_text() {
        assert_eq!(
            message_text(&json!({"content": "plain"})).as_deref(),
            Some("plain")
        );
        let parts = json!({"content": [
            {"type": "text", "text": "I was made "},
            {"type": "tool_use", "id": "t1"},
            {"type": "text", "text": "by Anthropic."}
        ]});
        assert_eq!(
            message_text(&parts).as_deref(),
            Some("I was made by Anthropic.")
        );
        assert!(message_text(&json!({"type": "ai"})).is_none());
    }
}

//! Console rendering of the demonstration output.

use std::borrow::Cow;

use graphrun::{Assistant, RunEvent};

/// Appended to payloads cut by [`truncate`].
pub const TRUNCATION_MARKER: &str = " ... (truncated)";

/// Cuts `text` after `max_chars` characters.
#[must_use]
pub fn truncate(text: &str, max_chars: Option<usize>) -> Cow<'_, str> {
    let Some(max) = max_chars else {
        return Cow::Borrowed(text);
    };
    match text.char_indices().nth(max) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// `Assistant <pretty JSON>`.
pub fn assistant(assistant: &Assistant) -> serde_json::Result<String> {
    Ok(format!(
        "Assistant {}",
        serde_json::to_string_pretty(assistant)?
    ))
}

/// Header line and compact payload of one event, followed by a blank line.
#[must_use]
pub fn event(event: &RunEvent, max_chars: Option<usize>) -> String {
    let data = event.data.to_string();
    format!(
        "Receiving new event of type: {}...\n{}\n",
        event.event,
        truncate(&data, max_chars)
    )
}

//! Streamed run events.
//!
//! A run stream is a Server-Sent Events body. [`RunStream`] decodes it
//! incrementally into [`RunEvent`]s and exposes them as a lazy, one-pass
//! sequence:
//!
//! - `Some(Ok(event))` - the next event, in the order the service sent it
//! - `Some(Err(_))` - the stream failed; this is the last item
//! - `None` - the run finished (or the stream already failed)
//!
//! Dropping a `RunStream` early is the way to stop consuming a run. It closes
//! the connection and leaves the [`Client`](crate::Client) untouched; the
//! service may keep executing the run.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::FusedStream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StreamError};
use crate::message::{is_ai_message, message_text};

/// Phase of a `messages/*` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessagesPhase {
    /// `messages/partial`: the message so far.
    Partial,
    /// `messages/complete`: the finished message.
    Complete,
    /// `messages/metadata`: metadata about messages in flight.
    Metadata,
    /// Bare `messages`: a `[chunk, metadata]` tuple.
    Tuple,
}

/// Classified kind of a [`RunEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Run metadata, sent first (`{"run_id": ...}`).
    Metadata,
    /// Full graph state.
    Values,
    /// Per-node updates.
    Updates,
    /// Model message traffic.
    Messages(MessagesPhase),
    /// Internal execution events.
    Events,
    /// Debug traces.
    Debug,
    /// Data emitted by graph nodes.
    Custom,
    /// The run failed.
    Error,
    /// The run finished.
    End,
    /// Anything else, verbatim.
    Other(String),
}

impl EventKind {
    /// Classify a raw event name.
    ///
    /// Subgraph events are namespaced as `kind|path`; only the part before
    /// the first `|` is used.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let base = name.split('|').next().unwrap_or(name);
        match base {
            "metadata" => Self::Metadata,
            "values" => Self::Values,
            "updates" => Self::Updates,
            "messages" => Self::Messages(MessagesPhase::Tuple),
            "messages/partial" => Self::Messages(MessagesPhase::Partial),
            "messages/complete" => Self::Messages(MessagesPhase::Complete),
            "messages/metadata" => Self::Messages(MessagesPhase::Metadata),
            "events" => Self::Events,
            "debug" => Self::Debug,
            "custom" => Self::Custom,
            "error" => Self::Error,
            "end" => Self::End,
            _ => Self::Other(name.to_owned()),
        }
    }

    /// Returns `true` for message events carrying model output.
    #[must_use]
    pub const fn is_message_output(&self) -> bool {
        matches!(
            self,
            Self::Messages(MessagesPhase::Partial | MessagesPhase::Complete | MessagesPhase::Tuple)
        )
    }
}

/// One incremental unit of a run's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Event kind as sent by the service.
    pub event: String,
    /// Event payload.
    pub data: Value,
}

impl RunEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Builds an event from a decoded SSE frame.
    ///
    /// Empty data becomes `null`; data that is not JSON is kept as a string.
    #[must_use]
    pub fn from_frame(event: impl Into<String>, data: &str) -> Self {
        let data = if data.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_owned()))
        };
        Self::new(event, data)
    }

    /// Classified kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event)
    }

    /// Returns `true` if this event carries output of a model.
    ///
    /// That is any message event with content, or a `values`/`updates`
    /// event whose state includes an AI message.
    #[must_use]
    pub fn is_model_response(&self) -> bool {
        match self.kind() {
            kind if kind.is_message_output() => !self.data.is_null(),
            EventKind::Values => self
                .data
                .get("messages")
                .and_then(Value::as_array)
                .is_some_and(|messages| messages.iter().any(is_ai_message)),
            EventKind::Updates => self.data.as_object().is_some_and(|nodes| {
                nodes.values().any(|update| {
                    update
                        .get("messages")
                        .and_then(Value::as_array)
                        .is_some_and(|messages| messages.iter().any(is_ai_message))
                })
            }),
            _ => false,
        }
    }

    /// Text of the latest AI message in a `values` event.
    #[must_use]
    pub fn reply_text(&self) -> Option<String> {
        if self.kind() != EventKind::Values {
            return None;
        }
        self.data
            .get("messages")?
            .as_array()?
            .iter()
            .rev()
            .find(|message| is_ai_message(message))
            .and_then(message_text)
    }

    /// The run id carried by a `metadata` event.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        if self.kind() == EventKind::Metadata {
            self.data.get("run_id").and_then(Value::as_str)
        } else {
            None
        }
    }
}

/// Lazy sequence of [`RunEvent`]s read from a streaming response.
pub struct RunStream {
    inner: Pin<Box<dyn Stream<Item = Result<RunEvent>> + Send>>,
    run_id: Option<String>,
    delivered: usize,
    finished: bool,
}

impl fmt::Debug for RunStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunStream")
            .field("run_id", &self.run_id)
            .field("delivered", &self.delivered)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl RunStream {
    /// Decodes a stream of SSE body chunks.
    ///
    /// Chunks may split frames anywhere; frames are reassembled before they
    /// are decoded.
    pub fn from_byte_stream<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let inner = async_stream::stream! {
            let mut frames = Box::pin(body.eventsource());
            while let Some(frame) = frames.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(EventStreamError::Transport(err)) => {
                        tracing::warn!(error = %err, "run stream transport failed");
                        yield Err(StreamError::Transport(err.to_string()).into());
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "malformed run stream");
                        yield Err(StreamError::Protocol(err.to_string()).into());
                        break;
                    }
                };

                let event = RunEvent::from_frame(frame.event, &frame.data);
                tracing::debug!(event = %event.event, "run event received");

                match event.kind() {
                    EventKind::End => break,
                    EventKind::Error => {
                        let err = StreamError::from_event_data(&event.data);
                        tracing::warn!(error = %err, "run failed on the server");
                        yield Err(err.into());
                        break;
                    }
                    _ => yield Ok(event),
                }
            }
        };

        Self {
            inner: Box::pin(inner),
            run_id: None,
            delivered: 0,
            finished: false,
        }
    }

    /// Wraps a streaming HTTP response.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        Self::from_byte_stream(response.bytes_stream())
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the run finished or after an error was returned.
    pub async fn next_event(&mut self) -> Option<Result<RunEvent>> {
        self.next().await
    }

    /// Drains the remaining events.
    ///
    /// Stops at the first error and returns it; events read before the error
    /// are discarded along with the stream.
    pub async fn collect_events(mut self) -> Result<Vec<RunEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event?);
        }
        Ok(events)
    }

    /// The run id, once the `metadata` event was read.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Number of events delivered so far.
    #[must_use]
    pub const fn delivered(&self) -> usize {
        self.delivered
    }
}

impl Stream for RunStream {
    type Item = Result<RunEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let polled = self.inner.as_mut().poll_next(cx);
        match &polled {
            Poll::Ready(Some(Ok(event))) => {
                if self.run_id.is_none()
                    && let Some(run_id) = event.run_id()
                {
                    self.run_id = Some(run_id.to_owned());
                }
                self.delivered += 1;
            }
            Poll::Ready(Some(Err(_)) | None) => self.finished = true,
            Poll::Pending => {}
        }
        polled
    }
}

impl FusedStream for RunStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn body(chunks: &[&str]) -> RunStream {
        let chunks: Vec<std::result::Result<String, std::io::Error>> =
            chunks.iter().map(|c| Ok((*c).to_owned())).collect();
        RunStream::from_byte_stream(futures::stream::iter(chunks))
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!(EventKind::parse("metadata"), EventKind::Metadata);
        assert_eq!(
            EventKind::parse("messages/partial"),
            EventKind::Messages(MessagesPhase::Partial)
        );
        assert_eq!(EventKind::parse("updates|agent:1"), EventKind::Updates);
        assert_eq!(
            EventKind::parse("feedback"),
            EventKind::Other("feedback".into())
        );
    }

    #[test]
    fn test_from_frame_payloads() {
        assert_eq!(RunEvent::from_frame("end", "").data, Value::Null);
        assert_eq!(
            RunEvent::from_frame("custom", "not json").data,
            json!("not json")
        );
        assert_eq!(
            RunEvent::from_frame("metadata", r#"{"run_id":"r-1"}"#).run_id(),
            Some("r-1")
        );
    }

    #[test]
    fn test_reply_text() {
        let values = RunEvent::new(
            "values",
            json!({"messages": [
                {"type": "human", "content": "who made you?"},
                {"type": "ai", "content": [{"type": "text", "text": "I was made "}, {"type": "text", "text": "by Anthropic."}]},
                {"type": "tool", "content": "ok"}
            ]}),
        );
        assert_eq!(values.reply_text().as_deref(), Some("I was made by Anthropic."));

        let human_only = RunEvent::new("values", json!({"messages": [{"type": "human", "content": "hi"}]}));
        assert_eq!(human_only.reply_text(), None);

        let partial = RunEvent::new("messages/partial", json!([{"type": "ai", "content": "I"}]));
        assert_eq!(partial.reply_text(), None);
    }

    #[test]
    fn test_is_model_response() {
        let partial = RunEvent::new(
            "messages/partial",
            json!([{"type": "ai", "content": "I was"}]),
        );
        assert!(partial.is_model_response());

        let values = RunEvent::new(
            "values",
            json!({"messages": [
                {"type": "human", "content": "who made you?"},
                {"type": "ai", "content": "Anthropic"}
            ]}),
        );
        assert!(values.is_model_response());

        let input_only = RunEvent::new(
            "values",
            json!({"messages": [{"type": "human", "content": "who made you?"}]}),
        );
        assert!(!input_only.is_model_response());

        let updates = RunEvent::new(
            "updates",
            json!({"agent": {"messages": [{"type": "ai", "content": "hi"}]}}),
        );
        assert!(updates.is_model_response());

        assert!(!RunEvent::new("metadata", json!({"run_id": "r"})).is_model_response());
        assert!(!RunEvent::new("messages/metadata", json!({"r": {}})).is_model_response());
    }

    #[tokio::test]
    async fn test_stream_in_order_until_eof() {
        let mut stream = body(&[
            "event: metadata\ndata: {\"run_id\":\"r-1\"}\n\n",
            "event: values\ndata: {\"messages\":[]}\n\n",
            "event: values\ndata: {\"messages\":[{\"type\":\"ai\",\"content\":\"hi\"}]}\n\n",
        ]);

        let first = stream.next_event().await.unwrap().unwrap();
        assert_eq!(first.kind(), EventKind::Metadata);
        assert_eq!(stream.run_id(), Some("r-1"));

        let rest = stream.collect_events().await.unwrap();
        assert_eq!(rest.len(), 2);
        assert!(rest[1].is_model_response());
    }

    #[tokio::test]
    async fn test_frames_split_across_chunks() {
        let stream = body(&[
            "event: val",
            "ues\ndata: {\"mess",
            "ages\": []}\n",
            "\nevent: values\ndata: {\"step\": 2}\n\n",
        ]);

        let events = stream.collect_events().await.unwrap();
        assert_eq!(
            events,
            vec![
                RunEvent::new("values", json!({"messages": []})),
                RunEvent::new("values", json!({"step": 2})),
            ]
        );
    }

    #[tokio::test]
    async fn test_end_event_terminates_without_being_yielded() {
        let mut stream = body(&[
            "event: values\ndata: {}\n\n",
            "event: end\ndata: null\n\n",
            "event: values\ndata: {\"late\": true}\n\n",
        ]);

        assert!(stream.next_event().await.unwrap().is_ok());
        assert!(stream.next_event().await.is_none());
        assert!(stream.is_terminated());
        assert_eq!(stream.delivered(), 1);
    }

    #[tokio::test]
    async fn test_error_event_terminates_stream() {
        let mut stream = body(&[
            "event: values\ndata: {\"messages\":[]}\n\n",
            "event: error\ndata: {\"error\":\"ValueError\",\"message\":\"no model\"}\n\n",
            "event: values\ndata: {}\n\n",
        ]);

        assert!(stream.next_event().await.unwrap().is_ok());
        let err = stream.next_event().await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Stream(StreamError::Server { ref error, ref message })
                if error == "ValueError" && message == "no model"
        ));
        assert!(stream.next_event().await.is_none());
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_terminates_stream() {
        let chunks: Vec<std::result::Result<String, std::io::Error>> = vec![
            Ok("event: values\ndata: {}\n\n".to_owned()),
            Err(std::io::Error::other("connection reset")),
            Ok("event: values\ndata: {}\n\n".to_owned()),
        ];
        let mut stream = RunStream::from_byte_stream(futures::stream::iter(chunks));

        assert!(stream.next_event().await.unwrap().is_ok());
        let err = stream.next_event().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Stream(StreamError::Transport(ref m)) if m.contains("reset")));
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_collect_events_returns_error() {
        let stream = body(&["event: error\ndata: \"boom\"\n\n"]);
        let err = stream.collect_events().await.unwrap_err();
        assert_eq!(err.to_string(), "run stream failed: Error: boom");
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_sequence() {
        let mut stream = body(&[]);
        assert!(stream.next_event().await.is_none());
        assert_eq!(stream.delivered(), 0);
    }
}

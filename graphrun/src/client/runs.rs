//! Run endpoints.

use serde_json::Value;

use crate::error::Result;
use crate::run::{Run, RunCreate};
use crate::stream::RunStream;

use super::Client;

/// Run operations, obtained from [`Client::runs`].
#[derive(Debug, Clone, Copy)]
pub struct Runs<'a> {
    client: &'a Client,
}

impl<'a> Runs<'a> {
    pub(super) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Start a run and stream its events.
    pub async fn stream(&self, thread_id: &str, request: &RunCreate) -> Result<RunStream> {
        tracing::debug!(
            thread_id,
            assistant_id = %request.assistant_id,
            stream_mode = ?request.stream_mode,
            "streaming run"
        );
        self.client
            .post_stream(
                self.client.endpoint(&["threads", thread_id, "runs", "stream"]),
                request,
            )
            .await
    }

    /// Start a run in the background.
    pub async fn create(&self, thread_id: &str, request: &RunCreate) -> Result<Run> {
        let run: Run = self
            .client
            .post_json(
                self.client.endpoint(&["threads", thread_id, "runs"]),
                request,
                "run",
            )
            .await?;
        tracing::info!(run_id = %run.run_id, thread_id, status = %run.status.as_str(), "run created");
        Ok(run)
    }

    /// Fetch a run.
    pub async fn get(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client
            .get_json(
                self.client.endpoint(&["threads", thread_id, "runs", run_id]),
                "run",
            )
            .await
    }

    /// Cancel a run. With `wait`, the call returns once the run stopped.
    pub async fn cancel(&self, thread_id: &str, run_id: &str, wait: bool) -> Result<()> {
        let mut url = self
            .client
            .endpoint(&["threads", thread_id, "runs", run_id, "cancel"]);
        url.query_pairs_mut()
            .append_pair("wait", if wait { "true" } else { "false" });
        self.client.post_empty(url).await
    }

    /// Wait for a run to finish and return the thread's final values.
    pub async fn join(&self, thread_id: &str, run_id: &str) -> Result<Value> {
        self.client
            .get_json(
                self.client
                    .endpoint(&["threads", thread_id, "runs", run_id, "join"]),
                "thread values",
            )
            .await
    }
}

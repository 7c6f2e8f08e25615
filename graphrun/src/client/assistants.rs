//! Assistant endpoints.

use crate::assistant::{Assistant, AssistantCreate, AssistantSearch};
use crate::error::Result;

use super::Client;

/// Assistant operations, obtained from [`Client::assistants`].
#[derive(Debug, Clone, Copy)]
pub struct Assistants<'a> {
    client: &'a Client,
}

impl<'a> Assistants<'a> {
    pub(super) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create an assistant.
    ///
    /// Fails with a request error if the graph is unknown to the service.
    pub async fn create(&self, request: &AssistantCreate) -> Result<Assistant> {
        tracing::debug!(graph_id = %request.graph_id, "creating assistant");
        let assistant: Assistant = self
            .client
            .post_json(self.client.endpoint(&["assistants"]), request, "assistant")
            .await?;
        tracing::info!(
            assistant_id = %assistant.assistant_id,
            graph_id = %assistant.graph_id,
            "assistant created"
        );
        Ok(assistant)
    }

    /// Fetch an assistant by id.
    pub async fn get(&self, assistant_id: &str) -> Result<Assistant> {
        self.client
            .get_json(
                self.client.endpoint(&["assistants", assistant_id]),
                "assistant",
            )
            .await
    }

    /// Delete an assistant.
    pub async fn delete(&self, assistant_id: &str) -> Result<()> {
        self.client
            .delete(self.client.endpoint(&["assistants", assistant_id]))
            .await
    }

    /// List assistants matching a search.
    pub async fn search(&self, query: &AssistantSearch) -> Result<Vec<Assistant>> {
        self.client
            .post_json(
                self.client.endpoint(&["assistants", "search"]),
                query,
                "list of assistants",
            )
            .await
    }
}

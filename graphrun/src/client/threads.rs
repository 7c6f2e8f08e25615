//! Thread endpoints.

use crate::error::Result;
use crate::thread::{Thread, ThreadCreate, ThreadState};

use super::Client;

/// Thread operations, obtained from [`Client::threads`].
#[derive(Debug, Clone, Copy)]
pub struct Threads<'a> {
    client: &'a Client,
}

impl<'a> Threads<'a> {
    pub(super) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a thread. Needs no assistant.
    pub async fn create(&self, request: &ThreadCreate) -> Result<Thread> {
        let thread: Thread = self
            .client
            .post_json(self.client.endpoint(&["threads"]), request, "thread")
            .await?;
        tracing::info!(thread_id = %thread.thread_id, "thread created");
        Ok(thread)
    }

    /// Fetch a thread by id.
    pub async fn get(&self, thread_id: &str) -> Result<Thread> {
        self.client
            .get_json(self.client.endpoint(&["threads", thread_id]), "thread")
            .await
    }

    /// Delete a thread.
    pub async fn delete(&self, thread_id: &str) -> Result<()> {
        self.client
            .delete(self.client.endpoint(&["threads", thread_id]))
            .await
    }

    /// Read the latest state of a thread.
    pub async fn state(&self, thread_id: &str) -> Result<ThreadState> {
        self.client
            .get_json(
                self.client.endpoint(&["threads", thread_id, "state"]),
                "thread state",
            )
            .await
    }
}

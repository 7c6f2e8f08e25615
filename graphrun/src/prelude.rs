//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use graphrun::prelude::*;
//! ```

pub use crate::assistant::{
    Assistant, AssistantCreate, AssistantSearch, Configurable, GraphConfig, ModelName, OnConflict,
};
pub use crate::client::{Assistants, Client, Runs, Threads};
pub use crate::config::ClientConfig;
pub use crate::error::{ConfigError, Error, RequestError, Result, StreamError};
pub use crate::message::{InputMessage, Role};
pub use crate::retry::RetryConfig;
pub use crate::run::{MultitaskStrategy, Run, RunCreate, RunInput, RunStatus, StreamMode};
pub use crate::stream::{EventKind, MessagesPhase, RunEvent, RunStream};
pub use crate::thread::{Thread, ThreadCreate, ThreadState, ThreadStatus};

pub use futures::StreamExt;

//! graphrun - a typed client for hosted graph-agent services.
//!
//! The service runs agent graphs; this crate provisions configured
//! assistants and threads and streams the events of runs:
//!
//! - [`Client`] - connection, retries and the resource APIs
//! - [`GraphConfig`] - typed assistant configuration with pass-through keys
//! - [`RunStream`] - lazy, ordered sequence of [`RunEvent`]s

pub mod assistant;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod prelude;
pub mod retry;
pub mod run;
pub mod stream;
pub mod thread;

pub use assistant::{Assistant, GraphConfig, ModelName};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ConfigError, Error, RequestError, Result, StreamError};
pub use retry::RetryConfig;
pub use run::{RunInput, StreamMode};
pub use stream::{EventKind, RunEvent, RunStream};
pub use thread::Thread;

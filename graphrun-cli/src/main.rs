//! graphrun CLI
//!
//! Creates a configured assistant on a graph-agent service, opens a thread
//! and prints every event of one streamed run.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use graphrun::prelude::*;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, Overrides};
use crate::error::Result;

/// Provision a configured assistant and stream one run
#[derive(Debug, Parser)]
#[command(name = "graphrun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "GRAPHRUN_CONFIG")]
    config: Option<PathBuf>,

    /// Service URL
    #[arg(long, env = ClientConfig::ENV_API_URL)]
    api_url: Option<String>,

    /// API key sent as x-api-key
    #[arg(long, env = ClientConfig::ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = ClientConfig::ENV_TIMEOUT_SECS)]
    timeout_secs: Option<u64>,

    /// Attempts per request, including the first
    #[arg(long, env = ClientConfig::ENV_MAX_RETRIES)]
    max_attempts: Option<u32>,

    /// Graph the assistant is bound to [default: agent]
    #[arg(short, long)]
    graph: Option<String>,

    /// Model name (the service default applies when unset)
    #[arg(short, long, env = "GRAPHRUN_MODEL")]
    model: Option<String>,

    /// Message sent as the user turn
    #[arg(long, default_value = "who made you?")]
    message: String,

    /// Stream mode to request (repeatable)
    #[arg(long = "stream-mode", value_name = "MODE")]
    stream_modes: Vec<StreamMode>,

    /// Cut printed event payloads after this many characters
    #[arg(long)]
    max_event_chars: Option<usize>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
            max_attempts: self.max_attempts,
            graph_id: self.graph.clone(),
            model_name: self.model.clone(),
            max_event_chars: self.max_event_chars,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
///
/// Logs go to stderr; stdout carries the run output only.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "graphrun={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let settings = config::load_config(cli.config.as_deref())
        .await?
        .apply(cli.overrides());
    let client = Client::new(settings.client_config())?;

    let assistant = client
        .create_assistant(settings.graph_id(), settings.graph_config())
        .await?;
    println!("{}", render::assistant(&assistant)?);

    let thread = client.create_thread().await?;

    let input = RunInput::user(cli.message);
    let mut stream = if cli.stream_modes.is_empty() {
        client
            .stream_run(&thread.thread_id, &assistant.assistant_id, input)
            .await?
    } else {
        let request = cli
            .stream_modes
            .iter()
            .fold(RunCreate::new(&assistant.assistant_id).input(input), |request, mode| {
                request.stream_mode(*mode)
            });
        client.runs().stream(&thread.thread_id, &request).await?
    };

    let mut reply = None;
    while let Some(event) = stream.next_event().await {
        let event = event?;
        println!("{}", render::event(&event, settings.max_event_chars));
        if let Some(text) = event.reply_text() {
            reply = Some(text);
        }
    }

    tracing::debug!(
        run_id = stream.run_id().unwrap_or_default(),
        events = stream.delivered(),
        reply = reply.as_deref().unwrap_or_default(),
        "run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "graphrun",
            "--api-url",
            "http://127.0.0.1:2024",
            "--model",
            "openai",
            "--stream-mode",
            "messages",
            "--stream-mode",
            "values",
            "--max-event-chars",
            "1500",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.message, "who made you?");
        assert_eq!(cli.stream_modes, vec![StreamMode::Messages, StreamMode::Values]);

        let overrides = cli.overrides();
        assert_eq!(overrides.api_url.as_deref(), Some("http://127.0.0.1:2024"));
        assert_eq!(overrides.model_name.as_deref(), Some("openai"));
        assert_eq!(overrides.max_event_chars, Some(1500));
    }

    #[test]
    fn test_cli_rejects_unknown_stream_mode() {
        assert!(Cli::try_parse_from(["graphrun", "--stream-mode", "tokens"]).is_err());
    }
}

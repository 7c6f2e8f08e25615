//! Create a configured assistant and stream one run.
//!
//! ```bash
//! export GRAPHRUN_API_URL=http://localhost:8123
//! cargo run --example configured_agent
//! ```

#![allow(clippy::print_stdout)]

use graphrun::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let client = Client::from_env()?;

    let assistant = client
        .create_assistant("agent", GraphConfig::new().with_model(ModelName::OpenAI))
        .await?;
    println!("Assistant {}", serde_json::to_string_pretty(&assistant)?);

    let thread = client.create_thread().await?;

    let mut stream = client
        .stream_run(
            &thread.thread_id,
            &assistant.assistant_id,
            RunInput::user("who made you?"),
        )
        .await?;

    while let Some(event) = stream.next_event().await {
        let event = event?;
        println!("Receiving new event of type: {}...", event.event);
        println!("{}", event.data);
        println!();
    }

    Ok(())
}

//! Chat REPL that keeps the whole conversation, with a persona system prompt.

use clap::Parser;
use ragent::rag::{AgentBuilder, ConversationMode};
use ragent_demos::{init_tracing, ModelArgs, Repl};
use std::sync::Arc;
use tracing::error;

const PERSONA: &str = "You are an AI assistant called Jarvis. You are witty and reliable.";

#[derive(Debug, Parser)]
#[command(about = "Stateful chat with the Jarvis persona; type 'exit' to quit")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Only send the most recent turns to the model
    #[arg(long)]
    history_window: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut builder = AgentBuilder::new()
        .with_llm(Arc::new(cli.model.client()?))
        .with_system_prompt(PERSONA)
        .with_conversation_mode(ConversationMode::Stateful);
    if let Some(window) = cli.history_window {
        builder = builder.with_history_window(window);
    }
    let mut agent = builder.build()?;

    println!("Jarvis is online. Type 'exit' to quit.");
    let mut repl = Repl::new();

    while let Some(input) = repl.read("\nUser: ").await? {
        if input.is_empty() {
            continue;
        }
        match agent.run(input).await {
            Ok(response) => println!(
                "Jarvis: {}\n   ({} turns in memory)",
                response.text(),
                agent.conversation().len()
            ),
            Err(e) => error!(error = %e, "Exchange failed"),
        }
    }

    Ok(())
}

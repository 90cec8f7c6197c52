//! REPL agent that can list and read files under a root directory.

use clap::Parser;
use ragent::rag::{agent::tools::builtin, AgentBuilder, ConversationMode};
use ragent_demos::{init_tracing, print_tool_log, ModelArgs, Repl};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Parser)]
#[command(about = "Developer assistant with read-only file access; type 'exit' to quit")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Directory the assistant may explore
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Maximum tool round-trips per question
    #[arg(long, default_value_t = 10)]
    max_steps: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let root = std::fs::canonicalize(&cli.root)?;

    let system_prompt = format!(
        "You are a helpful developer assistant.\n\
         You have access to the file system via the 'list_directory' and 'read_file' tools.\n\
         Your working directory is: {}\n\
         When asked to analyze code, always read the file content first.\n\
         Start by listing files if you are unsure where things are.",
        root.display()
    );

    let mut agent = AgentBuilder::new()
        .with_llm(Arc::new(cli.model.client()?))
        .with_system_prompt(system_prompt)
        .with_tools(builtin::filesystem_tools(&root))
        .with_max_steps(cli.max_steps)
        .with_conversation_mode(ConversationMode::Stateless)
        .build()?;

    println!("Dev Assistant online (type 'exit' to quit)");
    println!("I can list files and read code in {}.", root.display());
    let mut repl = Repl::new();

    while let Some(input) = repl.read("\nYou: ").await? {
        if input.is_empty() {
            continue;
        }
        println!("Thinking...");
        match agent.run(input).await {
            Ok(response) => {
                println!("\nAI: {}", response.text());
                print_tool_log(&response);
            }
            Err(e) => error!(error = %e, "Exchange failed"),
        }
    }

    Ok(())
}

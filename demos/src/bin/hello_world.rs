//! Two independent completions: the model does not remember the first one.

use clap::Parser;
use ragent::llm::{CompletionClient, Turn};
use ragent_demos::{init_tracing, ModelArgs};
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Show that a bare completion call is stateless")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let client = cli.model.client()?;

    info!(model = client.model_name(), "Sending first request");
    let first = "Hello! My name is Theon.";
    let answer = client.complete(&[Turn::user(first)], &[]).await?;
    println!("\nUser: {first}\nAI: {}", answer.text().unwrap_or_default());

    info!("Sending second request without history");
    let second = "What is my name?";
    let answer = client.complete(&[Turn::user(second)], &[]).await?;
    println!("\nUser: {second}\nAI: {}", answer.text().unwrap_or_default());

    println!("\nThe model has no memory of its own: without the earlier turns it cannot know who you are.");
    Ok(())
}

//! Weather lookup and addition tools; prints which tools the model called.

use clap::Parser;
use ragent::rag::{agent::tools::builtin, AgentBuilder, ConversationMode};
use ragent_demos::{init_tracing, print_tool_log, ModelArgs};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(about = "Let the model call a mock weather service and a calculator")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Question to ask
    #[arg(default_value = "What is the weather like in Shanghai and Beijing? Compare them.")]
    question: String,

    /// Maximum tool round-trips
    #[arg(long, default_value_t = 5)]
    max_steps: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let weather = builtin::lookup_table(
        "get_weather",
        "Get the current weather in a given city.",
        "city",
        [
            ("Shanghai", "Sunny, 25°C"),
            ("Beijing", "Cloudy, 18°C"),
            ("London", "Rainy, 12°C"),
        ],
        "Unknown weather data for this city.",
    );

    let mut agent = AgentBuilder::new()
        .with_llm(Arc::new(cli.model.client()?))
        .with_system_prompt(
            "You are a helpful assistant. Use the get_weather tool whenever asked about weather \
             and the add tool for sums.",
        )
        .with_tools([weather, builtin::add()])
        .with_max_steps(cli.max_steps)
        .with_conversation_mode(ConversationMode::Stateless)
        .build()?;

    println!("User: {}", cli.question);
    let response = agent.run(cli.question).await?;
    println!("AI: {}", response.text());

    println!("\n[Debug] Execution steps: {}", response.steps);
    print_tool_log(&response);
    Ok(())
}

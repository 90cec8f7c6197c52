//! List the Gemini models available to the configured key.

use clap::Parser;
use ragent::llm::{ClientConfig, GeminiClient, ProviderKind};
use ragent_demos::init_tracing;

#[derive(Debug, Parser)]
#[command(about = "List Gemini chat and embedding models")]
struct Cli {
    /// Also print models that support neither chat nor embeddings
    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    anyhow::ensure!(
        config.provider == ProviderKind::Gemini,
        "model listing is only available for the gemini provider"
    );

    println!("Fetching available models for your API key...");
    let models = GeminiClient::new(config)?.list_models().await?;
    if models.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    println!("\nChat models (generateContent):");
    for model in models.iter().filter(|m| m.supports_generation()) {
        println!("  - {}", model.name);
    }

    println!("\nEmbedding models (embedContent):");
    for model in models.iter().filter(|m| m.supports_embedding()) {
        println!("  - {}", model.name);
    }

    if cli.all {
        println!("\nOther models:");
        for model in models
            .iter()
            .filter(|m| !m.supports_generation() && !m.supports_embedding())
        {
            println!("  - {} ({})", model.name, model.supported_generation_methods.join(", "));
        }
    }

    Ok(())
}

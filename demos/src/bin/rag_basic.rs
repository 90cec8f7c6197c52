//! Embed a small knowledge base and answer questions grounded in it.

use clap::Parser;
use ragent::llm::{CompletionClient, EmbeddingProvider, Turn};
use ragent::rag::{rag_prompt, CachedEmbeddingProvider, Retriever, VectorStore};
use ragent_demos::{init_tracing, ModelArgs};
use std::sync::Arc;
use tracing::info;

const KNOWLEDGE_BASE: [&str; 5] = [
    "Theon's birthday is on January 1st.",
    "Theon currently works at LEGO as a Senior Frontend Engineer.",
    "Theon's favourite singer is Jay Chou.",
    "OpenClaw is an AI agent framework built on Node.js.",
    "Theon's MBTI personality type is INTJ (Architect).",
];

const QUESTIONS: [&str; 3] = [
    "Where does Theon work?",
    "Whose songs does he like to listen to?",
    "Will the stock market go up tomorrow?",
];

#[derive(Debug, Parser)]
#[command(about = "Answer questions from an embedded knowledge base")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    /// Number of passages injected as context
    #[arg(long, default_value_t = 1)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let client = Arc::new(cli.model.client()?);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(CachedEmbeddingProvider::new(client.clone()));

    info!(entries = KNOWLEDGE_BASE.len(), "Building vector index");
    let store = VectorStore::index(KNOWLEDGE_BASE, embedder.as_ref()).await?;
    let retriever = Retriever::new(Arc::new(store), embedder).with_top_k(cli.top_k);

    for question in QUESTIONS {
        println!("\nUser Question: {question}");

        for hit in retriever.retrieve(question).await? {
            println!("  - Match: \"{}\" (score {:.4})", hit.text, hit.score);
        }

        let context = retriever.augment(question).await?;
        let prompt = rag_prompt(&context, question);
        let answer = client.complete(&[Turn::user(prompt)], &[]).await?;
        println!("AI Answer: {}", answer.text().unwrap_or_default());
    }

    Ok(())
}

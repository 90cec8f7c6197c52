//! # Ragent LLM
//!
//! Provider-facing building blocks for Ragent:
//!
//! - **Conversation types**: [`Turn`], [`Role`], [`ToolCallRequest`]
//! - **Tool schemas**: [`ToolDefinition`]
//! - **Capabilities**: [`CompletionClient`] and [`EmbeddingProvider`]
//! - **Providers**: [`GeminiClient`] and [`OpenAiClient`] (also serves Ollama), selected at
//!   runtime through [`Client`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragent_llm::{Client, CompletionClient, Turn};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::from_env()?;
//! let completion = client.complete(&[Turn::user("Hello!")], &[]).await?;
//! println!("{:?}", completion.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod mock;
pub mod tool;

#[cfg(any(feature = "gemini", feature = "openai"))]
pub mod provider;

pub use client::{Completion, CompletionClient, Embedding, EmbeddingProvider};
pub use config::{ClientConfig, ProviderKind};
pub use error::{LlmError, LlmResult};
pub use message::{generate_call_id, Role, ToolCallRequest, Turn};
pub use mock::ScriptedClient;
pub use tool::ToolDefinition;

#[cfg(any(feature = "gemini", feature = "openai"))]
pub use provider::Client;

#[cfg(feature = "gemini")]
pub use provider::{GeminiClient, ModelInfo};

#[cfg(feature = "openai")]
pub use provider::OpenAiClient;

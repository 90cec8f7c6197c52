//! # Ragent - Tool-calling agents with retrieval for Rust
//!
//! **Ragent** brings together:
//!
//! - **Ragent LLM**: conversation types and Gemini / OpenAI-compatible clients
//! - **Ragent RAG**: in-memory vector retrieval, validated tools and a bounded agent loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragent::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create LLM client
//!     let client = Client::from_env()?;
//!
//!     // Build an agent with a calculator tool
//!     let mut agent = AgentBuilder::new()
//!         .with_llm(Arc::new(client))
//!         .with_tool(builtin::add())
//!         .with_max_steps(5)
//!         .build()?;
//!
//!     // Run the agent
//!     let response = agent.run("What is 33 + 44?").await?;
//!     println!("{}", response.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!            ragent
//!       (umbrella crate)
//!              |
//!       +------+------+
//!       |             |
//!  ragent-llm    ragent-rag
//!  providers     retrieval, tools,
//!  and types     agent loop
//! ```

#![doc(html_root_url = "https://docs.rs/ragent/0.1.0")]
#![warn(missing_docs)]

// Re-export sub-crates
#[cfg(feature = "llm")]
pub use ragent_llm as llm;

#[cfg(feature = "rag")]
pub use ragent_rag as rag;

/// Commonly used types and traits
pub mod prelude {
    #[cfg(feature = "llm")]
    pub use crate::llm::{
        ClientConfig, Completion, CompletionClient, EmbeddingProvider, LlmError, ProviderKind,
        Role, ToolCallRequest, Turn,
    };

    #[cfg(feature = "llm")]
    pub use crate::llm::Client;

    #[cfg(feature = "rag")]
    pub use crate::rag::{
        agent::tools::builtin, Agent, AgentBuilder, AgentConfig, AgentResponse, ConversationMode,
        ParameterSpec, ParameterType, RagentError, RagentResult, Retriever, Tool, ToolRegistry,
        ToolSchema, VectorStore,
    };
}

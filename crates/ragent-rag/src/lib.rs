//! # Ragent RAG
//!
//! The core of Ragent:
//!
//! - **Retrieval**: [`VectorStore`] with cosine similarity ranking and a [`Retriever`]
//!   that turns a question into context
//! - **Tools**: [`ToolRegistry`] with schema validation; tool failures become text the
//!   model can read
//! - **Agent**: [`AgentLoop`], a bounded state machine alternating between the model and
//!   the tools, wrapped in an [`Agent`] session
//!
//! ## Example
//!
//! ```rust,no_run
//! use ragent_llm::{EmbeddingProvider, ScriptedClient};
//! use ragent_rag::{AgentBuilder, HashEmbeddingProvider, Retriever, VectorStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> ragent_rag::RagentResult<()> {
//! let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(256));
//! let store = VectorStore::index(["Theon works at LEGO."], embedder.as_ref()).await?;
//!
//! let mut agent = AgentBuilder::new()
//!     .with_llm(Arc::new(ScriptedClient::new().then_text("At LEGO.")))
//!     .with_retriever(Retriever::new(Arc::new(store), embedder))
//!     .build()?;
//!
//! println!("{}", agent.run("Where does Theon work?").await?.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod retrieval;

pub use agent::{
    tools::{ParameterSpec, ParameterType, Tool, ToolCallResult, ToolExecutor, ToolRegistry, ToolSchema},
    Agent, AgentBuilder, AgentConfig, AgentLoop, AgentOutcome, AgentResponse, ConversationMode,
    ConversationState, LoopState, ToolCallRecord,
};
pub use error::{RagentError, RagentResult};
pub use retrieval::{
    cosine_similarity, rag_prompt, CachedEmbeddingProvider, HashEmbeddingProvider, Retriever,
    SearchResult, VectorEntry, VectorStore,
};

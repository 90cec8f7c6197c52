//! # Ragent Agent Module
//!
//! Tool-calling agent with optional retrieval and bounded history.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragent_llm::Client;
//! use ragent_rag::agent::{tools::builtin, AgentBuilder};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut agent = AgentBuilder::new()
//!     .with_llm(Arc::new(Client::from_env()?))
//!     .with_tool(builtin::add())
//!     .build()?;
//!
//! let response = agent.run("What's 2 + 2?").await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

mod agent;
mod builder;
mod config;
mod executor;
pub mod memory;
pub mod tools;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use config::{AgentConfig, ConversationMode, DEFAULT_SYSTEM_PROMPT};
pub use executor::{
    AgentLoop, AgentOutcome, AgentResponse, LoopState, ToolCallRecord, STEP_LIMIT_MARKER,
};
pub use memory::ConversationState;

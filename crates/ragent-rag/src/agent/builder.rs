//! Builder for [`Agent`]

use super::tools::{Tool, ToolRegistry};
use super::{Agent, AgentConfig, ConversationMode};
use crate::error::{RagentError, RagentResult};
use crate::retrieval::Retriever;
use ragent_llm::CompletionClient;
use std::sync::Arc;

/// Assembles an [`Agent`] from a client, tools, an optional retriever and settings
#[derive(Default)]
pub struct AgentBuilder {
    llm_client: Option<Arc<dyn CompletionClient>>,
    tools: Vec<Tool>,
    retriever: Option<Retriever>,
    config: AgentConfig,
}

impl AgentBuilder {
    /// Start with default settings and no tools
    pub fn new() -> Self {
        Self::default()
    }

    /// Completion provider (required)
    pub fn with_llm(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Offer one more tool
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Offer several tools
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Prepend retrieved context to every question
    ///
    /// The configured `retrieval_top_k` applies only when the retriever has no
    /// match count of its own.
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Set the step limit
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    /// Set the conversation mode
    pub fn with_conversation_mode(mut self, mode: ConversationMode) -> Self {
        self.config.conversation_mode = mode;
        self
    }

    /// Bound the history sent to the model
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.config.history_window = Some(turns);
        self
    }

    /// Toggle verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the agent
    ///
    /// Fails without a client, on duplicate tool names or on invalid settings.
    pub fn build(self) -> RagentResult<Agent> {
        let llm_client = self
            .llm_client
            .ok_or_else(|| RagentError::configuration("an LLM client is required"))?;

        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register(tool)?;
        }

        let agent = Agent::new(llm_client, registry, self.config)?;
        Ok(match self.retriever {
            Some(retriever) => agent.with_retriever(retriever),
            None => agent,
        })
    }
}

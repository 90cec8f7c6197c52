//! Core Agent implementation

use super::executor::{AgentLoop, AgentResponse};
use super::memory::ConversationState;
use super::tools::ToolRegistry;
use super::{AgentConfig, ConversationMode};
use crate::error::RagentResult;
use crate::retrieval::{rag_prompt, Retriever};
use ragent_llm::CompletionClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Agent that can use tools, consult a knowledge base and keep a conversation
pub struct Agent {
    /// Completion provider
    llm_client: Arc<dyn CompletionClient>,

    /// Tools offered to the model
    tools: ToolRegistry,

    /// Optional context lookup run before each exchange
    retriever: Option<Retriever>,

    /// History of the current session
    conversation: ConversationState,

    /// Agent configuration
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        llm_client: Arc<dyn CompletionClient>,
        tools: ToolRegistry,
        config: AgentConfig,
    ) -> RagentResult<Self> {
        config.validate()?;

        Ok(Self {
            llm_client,
            tools,
            retriever: None,
            conversation: ConversationState::with_system_prompt(&config.system_prompt),
            config,
        })
    }

    /// Attach a retriever whose context is prepended to every question
    ///
    /// A match count set with [`Retriever::with_top_k`] is kept; otherwise
    /// `retrieval_top_k` from the configuration applies.
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever.or_top_k(self.config.retrieval_top_k));
        self
    }

    /// Run one exchange for `user_input`
    ///
    /// In stateless mode every call starts from the system prompt alone.
    /// In stateful mode the previous turns are kept.
    pub async fn run(&mut self, user_input: impl Into<String>) -> RagentResult<AgentResponse> {
        let input = user_input.into();

        info!(user_input = %input, "Agent received user input");

        let prompt = match &self.retriever {
            Some(retriever) => {
                let context = retriever.augment(&input).await?;
                debug!(context_length = context.len(), "Augmented question with retrieved context");
                rag_prompt(&context, &input)
            }
            None => input,
        };

        if self.config.conversation_mode == ConversationMode::Stateless {
            self.conversation = ConversationState::with_system_prompt(&self.config.system_prompt);
        }

        if self.config.verbose {
            info!(prompt = %prompt, "Processing user query");
        }

        self.conversation.push_user(prompt)?;

        let response = AgentLoop::new(self.llm_client.as_ref(), &self.tools, self.config.max_steps)
            .with_history_window(self.config.history_window)
            .run(&mut self.conversation)
            .await?;

        if self.config.verbose {
            info!(
                answer = %response.text(),
                steps = response.steps,
                tool_calls = response.tool_calls.len(),
                "Exchange finished"
            );
        }

        Ok(response)
    }

    /// Start a new conversation holding only the system prompt
    pub fn reset(&mut self) {
        debug!(conversation_id = %self.conversation.id(), "Resetting conversation");
        self.conversation = ConversationState::with_system_prompt(&self.config.system_prompt);
    }

    /// Current conversation
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.llm_client.model_name())
            .field("tools", &self.tools.names())
            .field("retriever", &self.retriever)
            .field("turns", &self.conversation.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tools::builtin;
    use crate::retrieval::{HashEmbeddingProvider, VectorStore};
    use ragent_llm::{EmbeddingProvider, Role, ScriptedClient, ToolCallRequest};
    use serde_json::json;

    fn agent(client: Arc<ScriptedClient>, mode: ConversationMode) -> Agent {
        let tools = ToolRegistry::new().with_tool(builtin::add()).unwrap();
        let config = AgentConfig::default()
            .with_system_prompt("You are Jarvis.")
            .with_conversation_mode(mode);
        Agent::new(client, tools, config).unwrap()
    }

    #[tokio::test]
    async fn test_stateful_mode_remembers_previous_turns() {
        let client = Arc::new(ScriptedClient::new().then_text("Hi Theon").then_text("You are Theon"));
        let mut agent = agent(client.clone(), ConversationMode::Stateful);

        agent.run("My name is Theon").await.unwrap();
        agent.run("What is my name?").await.unwrap();

        let second = &client.calls()[1].conversation;
        assert_eq!(second.len(), 4);
        assert_eq!(second[1].content, "My name is Theon");
        assert_eq!(agent.conversation().len(), 5);
    }

    #[tokio::test]
    async fn test_stateless_mode_forgets() {
        let client = Arc::new(ScriptedClient::new().then_text("Hi").then_text("I don't know"));
        let mut agent = agent(client.clone(), ConversationMode::Stateless);

        agent.run("My name is Theon").await.unwrap();
        agent.run("What is my name?").await.unwrap();

        let second = &client.calls()[1].conversation;
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].role, Role::System);
        assert_eq!(second[1].content, "What is my name?");
    }

    #[tokio::test]
    async fn test_reset_keeps_only_system_prompt() {
        let client = Arc::new(
            ScriptedClient::new()
                .then_tool_calls(vec![ToolCallRequest::from_json("c1", "add", json!({"a": 1, "b": 2}))])
                .then_text("3"),
        );
        let mut agent = agent(client, ConversationMode::Stateful);

        let response = agent.run("1 + 2?").await.unwrap();
        assert_eq!(response.text(), "3");
        assert!(agent.conversation().len() > 2);

        agent.reset();
        assert_eq!(agent.conversation().len(), 1);
        assert_eq!(agent.conversation().turns()[0].content, "You are Jarvis.");
    }

    #[tokio::test]
    async fn test_retriever_context_is_injected() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(4096));
        let store = VectorStore::index(
            ["Theon works at LEGO in Billund.", "The sky is blue."],
            embedder.as_ref(),
        )
        .await
        .unwrap();

        let client = Arc::new(ScriptedClient::new().then_text("LEGO"));
        let mut agent = agent(client.clone(), ConversationMode::Stateless)
            .with_retriever(Retriever::new(Arc::new(store), embedder));

        agent.run("Where does Theon work?").await.unwrap();

        let sent = &client.calls()[0].conversation;
        let question = &sent.last().unwrap().content;
        assert!(question.contains("[Context]\nTheon works at LEGO in Billund.\n"));
        assert!(question.ends_with("[Question]\nWhere does Theon work?"));
    }

    #[tokio::test]
    async fn test_retriever_match_count_precedence() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(64));
        let store = Arc::new(VectorStore::index(["a", "b", "c"], embedder.as_ref()).await.unwrap());
        let config = AgentConfig::default().with_retrieval_top_k(2);

        let agent = Agent::new(Arc::new(ScriptedClient::new()), ToolRegistry::new(), config.clone())
            .unwrap()
            .with_retriever(Retriever::new(store.clone(), embedder.clone()).with_top_k(3));
        assert_eq!(agent.retriever.as_ref().map(Retriever::top_k), Some(3));

        let agent = Agent::new(Arc::new(ScriptedClient::new()), ToolRegistry::new(), config)
            .unwrap()
            .with_retriever(Retriever::new(store, embedder));
        assert_eq!(agent.retriever.as_ref().map(Retriever::top_k), Some(2));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let client = Arc::new(ScriptedClient::new());
        let result = Agent::new(
            client,
            ToolRegistry::new(),
            AgentConfig::default().with_max_steps(0),
        );
        assert!(result.is_err());
    }
}

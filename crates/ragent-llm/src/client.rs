//! Capability traits implemented by provider bindings

use crate::error::LlmResult;
use crate::message::{ToolCallRequest, Turn};
use crate::tool::ToolDefinition;
use serde::{Deserialize, Serialize};

/// What the model produced for one request
///
/// A completion is either a final text answer or a list of tool calls, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Plain text answer
    Text(String),

    /// Ordered tool invocation requests
    ToolCalls(Vec<ToolCallRequest>),
}

impl Completion {
    /// Normalise a provider answer that may carry both text and tool calls
    ///
    /// Tool calls win; an empty call list falls back to the text.
    pub fn from_parts(text: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        if tool_calls.is_empty() {
            Completion::Text(text.unwrap_or_default())
        } else {
            Completion::ToolCalls(tool_calls)
        }
    }

    /// Text of a final answer
    pub fn text(&self) -> Option<&str> {
        match self {
            Completion::Text(text) => Some(text),
            Completion::ToolCalls(_) => None,
        }
    }

    /// Requested tool calls
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Completion::Text(_) => &[],
            Completion::ToolCalls(calls) => calls,
        }
    }
}

/// Sends a conversation plus tool schemas to a model
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Ask the model for the next step of `conversation`
    async fn complete(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> LlmResult<Completion>;

    /// Model identifier used for completions
    fn model_name(&self) -> &str;
}

/// A dense embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The vector components
    pub vector: Vec<f32>,

    /// Model used to generate the embedding
    pub model: String,
}

impl Embedding {
    /// Create a new embedding
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            vector,
            model: model.into(),
        }
    }

    /// Dimensionality of the embedding
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Turns text into embedding vectors
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for the given text
    async fn embed(&self, text: &str) -> LlmResult<Embedding>;

    /// Model identifier used for embeddings
    fn embedding_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_completion_prefers_tool_calls() {
        let call = ToolCallRequest::new("1", "add", Map::new());
        let completion = Completion::from_parts(Some("thinking".into()), vec![call]);
        assert_eq!(completion.tool_calls().len(), 1);
        assert!(completion.text().is_none());
    }

    #[test]
    fn test_completion_empty_calls_become_text() {
        let completion = Completion::from_parts(None, Vec::new());
        assert_eq!(completion, Completion::Text(String::new()));
    }
}

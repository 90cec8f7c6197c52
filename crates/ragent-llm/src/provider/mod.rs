//! Concrete provider bindings
//!
//! Each binding implements [`CompletionClient`] and [`EmbeddingProvider`] on top of one
//! shared `reqwest::Client`. [`Client`] picks the binding from a [`ClientConfig`].

#[cfg(feature = "gemini")]
mod gemini;
#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, ModelInfo};
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;

use crate::client::{Completion, CompletionClient, Embedding, EmbeddingProvider};
use crate::config::{ClientConfig, ProviderKind};
use crate::error::{LlmError, LlmResult};
use crate::message::Turn;
use crate::tool::ToolDefinition;

/// Provider client selected at runtime
pub enum Client {
    /// Google Gemini
    #[cfg(feature = "gemini")]
    Gemini(GeminiClient),

    /// OpenAI or an OpenAI-compatible server such as Ollama
    #[cfg(feature = "openai")]
    OpenAi(OpenAiClient),
}

impl Client {
    /// Build the client matching `config.provider`
    pub fn from_config(config: ClientConfig) -> LlmResult<Self> {
        match config.provider {
            #[cfg(feature = "gemini")]
            ProviderKind::Gemini => Ok(Client::Gemini(GeminiClient::new(config)?)),
            #[cfg(feature = "openai")]
            ProviderKind::OpenAi | ProviderKind::Ollama => Ok(Client::OpenAi(OpenAiClient::new(config)?)),
            #[allow(unreachable_patterns)]
            other => Err(LlmError::configuration(format!(
                "provider '{}' is not enabled in this build",
                other.as_str()
            ))),
        }
    }

    /// Build a client from environment variables (see [`ClientConfig::from_env`])
    pub fn from_env() -> LlmResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl CompletionClient for Client {
    async fn complete(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> LlmResult<Completion> {
        match self {
            #[cfg(feature = "gemini")]
            Client::Gemini(client) => client.complete(conversation, tools).await,
            #[cfg(feature = "openai")]
            Client::OpenAi(client) => client.complete(conversation, tools).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            #[cfg(feature = "gemini")]
            Client::Gemini(client) => client.model_name(),
            #[cfg(feature = "openai")]
            Client::OpenAi(client) => client.model_name(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for Client {
    async fn embed(&self, text: &str) -> LlmResult<Embedding> {
        match self {
            #[cfg(feature = "gemini")]
            Client::Gemini(client) => client.embed(text).await,
            #[cfg(feature = "openai")]
            Client::OpenAi(client) => client.embed(text).await,
        }
    }

    fn embedding_model(&self) -> &str {
        match self {
            #[cfg(feature = "gemini")]
            Client::Gemini(client) => client.embedding_model(),
            #[cfg(feature = "openai")]
            Client::OpenAi(client) => client.embedding_model(),
        }
    }
}

/// Build the shared HTTP client for a provider
pub(crate) fn http_client(config: &ClientConfig) -> LlmResult<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(client)
}

/// Turn a non-success response into [`LlmError::Api`], or parse the JSON body
pub(crate) async fn read_json<T>(provider: &str, response: reqwest::Response) -> LlmResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(LlmError::api(provider, status.as_u16(), error_message(&body)));
    }

    serde_json::from_str(&body).map_err(|e| LlmError::malformed(provider, e.to_string()))
}

/// Extract `error.message` from a provider error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

//! OpenAI-compatible chat completions binding (OpenAI, Ollama)

use super::{http_client, read_json};
use crate::client::{Completion, CompletionClient, Embedding, EmbeddingProvider};
use crate::config::ClientConfig;
use crate::error::{LlmError, LlmResult};
use crate::message::{generate_call_id, Role, ToolCallRequest, Turn};
use crate::tool::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Client for `/chat/completions` and `/embeddings`
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    embedding_model: String,
    provider: &'static str,
}

impl OpenAiClient {
    /// Create a client; the API key is optional for local servers
    pub fn new(config: ClientConfig) -> LlmResult<Self> {
        Ok(Self {
            http: http_client(&config)?,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            provider: config.provider.as_str(),
        })
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn build_request(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> ChatRequest {
        let messages = conversation
            .iter()
            .map(|turn| match turn.role {
                Role::System => ChatMessage::text("system", &turn.content),
                Role::User => ChatMessage::text("user", &turn.content),
                Role::Assistant if turn.has_tool_calls() => ChatMessage {
                    role: "assistant".to_string(),
                    content: None,
                    tool_calls: Some(
                        turn.tool_calls
                            .iter()
                            .map(|call| WireToolCall {
                                id: call.id.clone(),
                                kind: "function".to_string(),
                                function: WireFunction {
                                    name: call.name.clone(),
                                    arguments: Value::Object(call.arguments.clone()).to_string(),
                                },
                            })
                            .collect(),
                    ),
                    tool_call_id: None,
                },
                Role::Assistant => ChatMessage::text("assistant", &turn.content),
                Role::ToolResult => ChatMessage {
                    role: "tool".to_string(),
                    content: Some(turn.content.clone()),
                    tool_calls: None,
                    tool_call_id: turn.tool_call_id.clone(),
                },
            })
            .collect();

        let tools = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        ChatRequest {
            model: self.model.clone(),
            messages,
            tools,
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> LlmResult<Completion> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = self.build_request(conversation, tools);

        debug!(
            url = %url,
            model = %self.model,
            turn_count = conversation.len(),
            tool_count = tools.len(),
            "Calling chat completions"
        );

        let response = self.post(&url).json(&request).send().await?;
        let body: ChatResponse = read_json(self.provider, response).await?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::malformed(self.provider, "response contained no choices"))?;

        let calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = parse_arguments(&call.function.name, &call.function.arguments);
                let id = if call.id.is_empty() {
                    generate_call_id()
                } else {
                    call.id
                };
                ToolCallRequest::new(id, call.function.name, arguments)
            })
            .collect::<Vec<_>>();

        debug!(tool_call_count = calls.len(), "Chat completion received");

        Ok(Completion::from_parts(message.content, calls))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> LlmResult<Embedding> {
        let url = format!("{}/embeddings", self.endpoint);
        let request = json!({ "model": self.embedding_model, "input": text });

        debug!(url = %url, text_length = text.len(), "Calling embeddings");

        let response = self.post(&url).json(&request).send().await?;
        let body: EmbeddingsResponse = read_json(self.provider, response).await?;

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LlmError::malformed(self.provider, "response contained no embedding"))?;

        Ok(Embedding::new(vector, self.embedding_model.clone()))
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

/// Decode the JSON-string arguments of a tool call
///
/// Malformed arguments become an empty map so validation reports the missing
/// parameters back to the model instead of failing the exchange.
fn parse_arguments(tool: &str, raw: &str) -> Map<String, Value> {
    if raw.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(tool = %tool, args = %other, "Ignoring non-object tool arguments");
            Map::new()
        }
        Err(e) => {
            warn!(tool = %tool, error = %e, "Tool arguments are not valid JSON");
            Map::new()
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

//! Google Gemini (Generative Language API) binding

use super::{http_client, read_json};
use crate::client::{Completion, CompletionClient, Embedding, EmbeddingProvider};
use crate::config::ClientConfig;
use crate::error::{LlmError, LlmResult};
use crate::message::{generate_call_id, Role, ToolCallRequest, Turn};
use crate::tool::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

const PROVIDER: &str = "gemini";

/// Client for the Gemini REST API
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    embedding_model: String,
}

/// A model advertised by the `models` endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Model name without the `models/` prefix
    pub name: String,

    /// Generation methods such as `generateContent` or `embedContent`
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Whether the model can be used for chat completions
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }

    /// Whether the model can produce embeddings
    pub fn supports_embedding(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "embedContent")
    }
}

impl GeminiClient {
    /// Create a client; fails when no API key is configured
    pub fn new(config: ClientConfig) -> LlmResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            http: http_client(&config)?,
            api_key,
            endpoint: config.endpoint(),
            model: strip_models_prefix(&config.model).to_string(),
            embedding_model: strip_models_prefix(&config.embedding_model).to_string(),
        })
    }

    /// List models available to the configured API key, following pagination
    pub async fn list_models(&self) -> LlmResult<Vec<ModelInfo>> {
        let url = format!("{}/models", self.endpoint);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            debug!(url = %url, "Fetching Gemini models");

            let mut request = self.http.get(&url).header("x-goog-api-key", &self.api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ModelsPage = read_json(PROVIDER, request.send().await?).await?;
            models.extend(page.models.into_iter().map(|mut model| {
                model.name = strip_models_prefix(&model.name).to_string();
                model
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }

    fn build_request(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> GenerateRequest {
        let system: Vec<Part> = conversation
            .iter()
            .filter(|turn| turn.role == Role::System)
            .map(|turn| Part::text(turn.content.clone()))
            .collect();

        let mut contents: Vec<Content> = Vec::new();
        for turn in conversation.iter().filter(|turn| turn.role != Role::System) {
            let (role, part) = match turn.role {
                Role::User => ("user", vec![Part::text(turn.content.clone())]),
                Role::Assistant if turn.has_tool_calls() => (
                    "model",
                    turn.tool_calls
                        .iter()
                        .map(|call| Part {
                            function_call: Some(FunctionCall {
                                id: None,
                                name: call.name.clone(),
                                args: Value::Object(call.arguments.clone()),
                            }),
                            ..Part::default()
                        })
                        .collect(),
                ),
                Role::Assistant => ("model", vec![Part::text(turn.content.clone())]),
                Role::ToolResult => (
                    "user",
                    vec![Part {
                        function_response: Some(FunctionResponse {
                            name: turn.tool_name.clone().unwrap_or_default(),
                            response: json!({ "result": turn.content }),
                        }),
                        ..Part::default()
                    }],
                ),
                Role::System => continue,
            };

            // Gemini expects roles to alternate, so consecutive turns of one role share a content
            if let Some(last) = contents.last_mut().filter(|last| last.role == role) {
                last.parts.extend(part);
            } else {
                contents.push(Content {
                    role: role.to_string(),
                    parts: part,
                });
            }
        }

        let tools = if tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolsBlock {
                function_declarations: tools
                    .iter()
                    .map(|tool| FunctionDeclaration {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    })
                    .collect(),
            }]
        };

        GenerateRequest {
            system_instruction: if system.is_empty() {
                None
            } else {
                Some(SystemInstruction { parts: system })
            },
            contents,
            tools,
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> LlmResult<Completion> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let request = self.build_request(conversation, tools);

        debug!(
            url = %url,
            model = %self.model,
            turn_count = conversation.len(),
            tool_count = tools.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: GenerateResponse = read_json(PROVIDER, response).await?;
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed(PROVIDER, "response contained no candidates"))?;

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let mut text: Option<String> = None;
        let mut calls = Vec::new();

        for part in parts {
            if let Some(t) = part.text {
                text.get_or_insert_with(String::new).push_str(&t);
            }
            if let Some(call) = part.function_call {
                let arguments = match call.args {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        warn!(tool = %call.name, args = %other, "Ignoring non-object tool arguments");
                        Map::new()
                    }
                };
                let id = call.id.unwrap_or_else(generate_call_id);
                calls.push(ToolCallRequest::new(id, call.name, arguments));
            }
        }

        debug!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            tool_call_count = calls.len(),
            "Gemini response received"
        );

        Ok(Completion::from_parts(text, calls))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> LlmResult<Embedding> {
        let url = format!("{}/models/{}:embedContent", self.endpoint, self.embedding_model);
        let request = json!({
            "model": format!("models/{}", self.embedding_model),
            "content": { "parts": [{ "text": text }] },
        });

        debug!(url = %url, text_length = text.len(), "Calling Gemini embedContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: EmbedResponse = read_json(PROVIDER, response).await?;
        if body.embedding.values.is_empty() {
            return Err(LlmError::malformed(PROVIDER, "embedding has no values"));
        }

        Ok(Embedding::new(body.embedding.values, self.embedding_model.clone()))
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

fn strip_models_prefix(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolsBlock>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsBlock {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

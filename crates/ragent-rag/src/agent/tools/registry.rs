//! Tool registry: name lookup, argument validation and error-tolerant dispatch

use super::schema::ToolSchema;
use crate::error::{RagentError, RagentResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use ragent_llm::{ToolCallRequest, ToolDefinition};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Executes a tool with already validated arguments
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool
    async fn execute(&self, arguments: Map<String, Value>) -> anyhow::Result<Value>;
}

struct FnExecutor<F>(F);

#[async_trait::async_trait]
impl<F> ToolExecutor for FnExecutor<F>
where
    F: Fn(Map<String, Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync,
{
    async fn execute(&self, arguments: Map<String, Value>) -> anyhow::Result<Value> {
        (self.0)(arguments).await
    }
}

/// A named capability the model can call
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    schema: ToolSchema,
    executor: Arc<dyn ToolExecutor>,
}

impl Tool {
    /// Create a tool backed by `executor`
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        executor: impl ToolExecutor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            executor: Arc::new(executor),
        }
    }

    /// Create a tool from an async closure
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        f: F,
    ) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let executor = FnExecutor(move |args| f(args).boxed());
        Self::new(name, description, schema, executor)
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared parameters
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Definition offered to the model
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description, self.schema.to_json_schema())
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Outcome of one executed tool call, as fed back to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    /// Call this result answers
    pub call_id: String,

    /// Tool that was requested
    pub tool_name: String,

    /// Tool output, or the error text
    pub output: Result<Value, String>,
}

impl ToolCallResult {
    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        self.output.is_err()
    }

    /// Text content of the tool-result turn
    ///
    /// Strings are passed through, other values become compact JSON, errors are
    /// prefixed with `Error: `.
    pub fn render(&self) -> String {
        match &self.output {
            Ok(Value::String(text)) => text.clone(),
            Ok(value) => value.to_string(),
            Err(message) => format!("Error: {message}"),
        }
    }
}

/// Tools available to an agent, kept in registration order
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, tool: Tool) -> RagentResult<()> {
        if self.by_name.contains_key(tool.name()) {
            return Err(RagentError::DuplicateTool {
                name: tool.name().to_string(),
            });
        }

        debug!(tool = tool.name(), "Registered tool");
        self.by_name.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: Tool) -> RagentResult<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> RagentResult<&Tool> {
        self.by_name
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RagentError::ToolNotFound {
                name: name.to_string(),
            })
    }

    /// Validate `arguments` and run the named tool
    ///
    /// Executor failures, including panics, come back as `ToolExecution` errors.
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> RagentResult<Value> {
        let tool = self.resolve(name)?;
        tool.schema.validate(name, &arguments)?;

        let outcome = AssertUnwindSafe(tool.executor.execute(arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RagentError::tool_execution(name, format!("{e:#}"))),
            Err(_) => Err(RagentError::tool_execution(name, "tool panicked")),
        }
    }

    /// Run a model-requested call, turning every failure into an error result
    pub async fn execute_call(&self, request: &ToolCallRequest) -> ToolCallResult {
        info!(tool = %request.name, call_id = %request.id, "Executing tool call");

        let output = match self.invoke(&request.name, request.arguments.clone()).await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(tool = %request.name, call_id = %request.id, error = %e, "Tool call failed");
                Err(e.to_string())
            }
        };

        ToolCallResult {
            call_id: request.id.clone(),
            tool_name: request.name.clone(),
            output,
        }
    }

    /// Definitions of every tool, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

//! Conversation turns and tool call requests

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions for the model
    System,
    /// Input from the user
    User,
    /// Output produced by the model
    Assistant,
    /// Output of a tool invocation requested by the assistant
    ToolResult,
}

impl Role {
    /// Stable lowercase name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::ToolResult => "tool_result",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifier matching the request to its result turn
    pub id: String,

    /// Name of the requested tool
    pub name: String,

    /// Arguments produced by the model
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Create a request with an explicit call id
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Create a request with a generated call id
    ///
    /// Used for providers that do not assign call ids themselves.
    pub fn with_generated_id(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self::new(generate_call_id(), name, arguments)
    }

    /// Build a request from a JSON object literal; non-object values yield no arguments
    pub fn from_json(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, name, arguments)
    }
}

/// Generate a unique tool call id
pub fn generate_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// One message unit in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the turn
    pub role: Role,

    /// Text content
    pub content: String,

    /// For tool results: the call this turn answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// For tool results: the name of the tool that produced it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// For assistant turns: tool calls the model requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// When the turn was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Turn {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_name: None,
            tool_calls: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// System instruction turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// User input turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Assistant text turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Assistant turn requesting tool calls
    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        let mut turn = Self::with_role(Role::Assistant, String::new());
        turn.tool_calls = calls;
        turn
    }

    /// Tool result turn answering `call_id`
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut turn = Self::with_role(Role::ToolResult, content);
        turn.tool_call_id = Some(call_id.into());
        turn.tool_name = Some(tool_name.into());
        turn
    }

    /// Whether this assistant turn requested tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_turn_carries_call_reference() {
        let turn = Turn::tool_result("call_1", "add", "5");
        assert_eq!(turn.role, Role::ToolResult);
        assert_eq!(turn.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(turn.tool_name.as_deref(), Some("add"));
        assert_eq!(turn.content, "5");
    }

    #[test]
    fn test_generated_call_ids_are_unique() {
        let a = ToolCallRequest::with_generated_id("add", Map::new());
        let b = ToolCallRequest::with_generated_id("add", Map::new());
        assert!(a.id.starts_with("call_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_json_ignores_non_object_arguments() {
        let request = ToolCallRequest::from_json("1", "add", json!([1, 2]));
        assert!(request.arguments.is_empty());

        let request = ToolCallRequest::from_json("1", "add", json!({"a": 2}));
        assert_eq!(request.arguments.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let value = serde_json::to_value(Role::ToolResult).unwrap();
        assert_eq!(value, json!("tool_result"));
    }
}

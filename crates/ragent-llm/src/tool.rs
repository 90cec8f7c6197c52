//! Tool schemas presented to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a callable tool as sent to a provider
///
/// `parameters` is a JSON Schema object (`{"type": "object", "properties": ..., "required": [...]}`);
/// providers translate it into their own wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,

    /// What the tool does, shown to the model
    pub description: String,

    /// JSON Schema of the tool arguments
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

//! Declared tool parameters and argument validation

use crate::error::{RagentError, RagentResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// JSON string
    String,
    /// Any JSON number
    Number,
    /// Whole JSON number
    Integer,
    /// `true` / `false`
    Boolean,
    /// JSON object
    Object,
    /// JSON array
    Array,
}

impl ParameterType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether `value` has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Argument name
    pub name: String,

    /// Expected JSON type
    #[serde(rename = "type")]
    pub param_type: ParameterType,

    /// Shown to the model
    pub description: String,

    /// Whether the argument must be present
    pub required: bool,
}

impl ParameterSpec {
    /// A parameter that must be supplied
    pub fn required(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    /// A parameter that may be omitted
    pub fn optional(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Ordered parameter list of a tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    parameters: Vec<ParameterSpec>,
}

impl ToolSchema {
    /// Schema with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declared parameters in declaration order
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Check `arguments` against the declared parameters
    ///
    /// Missing (or null) required arguments and arguments of the wrong type are
    /// rejected. Arguments that are not declared are ignored.
    pub fn validate(&self, tool: &str, arguments: &Map<String, Value>) -> RagentResult<()> {
        for spec in &self.parameters {
            match arguments.get(&spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(RagentError::validation(
                        tool,
                        &spec.name,
                        "required parameter is missing",
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) if !spec.param_type.accepts(value) => {
                    return Err(RagentError::validation(
                        tool,
                        &spec.name,
                        format!(
                            "expected {}, got {}",
                            spec.param_type.as_str(),
                            json_type_name(value)
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// JSON Schema object sent to the model
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.param_type.as_str(), "description": p.description }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

//! Error types for retrieval, tools and the agent loop

use ragent_llm::LlmError;
use thiserror::Error;

/// Result alias used across the crate
pub type RagentResult<T> = Result<T, RagentError>;

/// Errors raised by the core
///
/// Configuration errors and provider errors end the current exchange. Tool failures
/// raised inside the agent loop are turned into tool-result turns instead of being
/// returned; step-limit termination is reported through `AgentOutcome::Aborted`.
#[derive(Debug, Error)]
pub enum RagentError {
    /// Vectors of different dimensionality were compared or stored together
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the store
        expected: usize,
        /// Dimensionality of the offending vector
        actual: usize,
    },

    /// A vector cannot take part in cosine similarity
    #[error("invalid embedding: {reason}")]
    InvalidEmbedding {
        /// Why the vector was rejected
        reason: String,
    },

    /// Tool arguments do not satisfy the declared schema
    #[error("invalid argument '{parameter}' for tool '{tool}': {reason}")]
    Validation {
        /// Tool being invoked
        tool: String,
        /// Offending parameter
        parameter: String,
        /// What is wrong with it
        reason: String,
    },

    /// No tool is registered under this name
    #[error("tool not found: {name}")]
    ToolNotFound {
        /// Requested tool name
        name: String,
    },

    /// A tool with this name is already registered
    #[error("tool already registered: {name}")]
    DuplicateTool {
        /// Conflicting tool name
        name: String,
    },

    /// The tool's own logic failed
    #[error("tool '{tool}' failed: {message}")]
    ToolExecution {
        /// Tool that failed
        tool: String,
        /// Failure description
        message: String,
    },

    /// A turn would break the conversation ordering rules
    #[error("conversation error: {message}")]
    Conversation {
        /// What ordering rule was broken
        message: String,
    },

    /// Settings could not be loaded or are inconsistent
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },

    /// Completion or embedding provider failed
    #[error("provider error during {operation}: {source}")]
    Provider {
        /// What the core was doing
        operation: String,
        /// Underlying provider error
        #[source]
        source: LlmError,
    },
}

impl RagentError {
    /// Create a validation error
    pub fn validation(
        tool: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            tool: tool.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a tool execution error
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a conversation ordering error
    pub fn conversation(message: impl Into<String>) -> Self {
        Self::Conversation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid embedding error
    pub fn invalid_embedding(reason: impl Into<String>) -> Self {
        Self::InvalidEmbedding {
            reason: reason.into(),
        }
    }

    /// Wrap a provider failure
    pub fn provider(operation: impl Into<String>, source: LlmError) -> Self {
        Self::Provider {
            operation: operation.into(),
            source,
        }
    }

    /// Whether this error is a configuration problem on the caller's side
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidEmbedding { .. }
                | Self::Validation { .. }
                | Self::ToolNotFound { .. }
                | Self::DuplicateTool { .. }
                | Self::Conversation { .. }
                | Self::Configuration { .. }
        )
    }

    /// Whether this error came from a completion or embedding provider
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(RagentError::validation("add", "a", "missing").is_configuration());
        assert!(RagentError::DimensionMismatch { expected: 3, actual: 2 }.is_configuration());
        assert!(!RagentError::tool_execution("read_file", "denied").is_configuration());

        let err = RagentError::provider("complete", LlmError::api("gemini", 500, "down"));
        assert!(err.is_provider());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_validation_message_names_parameter() {
        let err = RagentError::validation("add", "b", "required parameter is missing");
        assert_eq!(
            err.to_string(),
            "invalid argument 'b' for tool 'add': required parameter is missing"
        );
    }
}

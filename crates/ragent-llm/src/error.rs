//! Error types for provider calls

use thiserror::Error;

/// Result alias for provider operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Failure talking to a completion or embedding provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[cfg(any(feature = "gemini", feature = "openai"))]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} API returned {status}: {message}")]
    Api {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Error body reported by the provider
        message: String,
    },

    /// Provider answered with a body we could not interpret
    #[error("malformed response from {provider}: {message}")]
    MalformedResponse {
        /// Provider name
        provider: String,
        /// What was wrong
        message: String,
    },

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration is incomplete or invalid
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing or invalid
        message: String,
    },
}

impl LlmError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the provider rejected the call because of rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api { status: 429, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(LlmError::api("gemini", 429, "quota").is_rate_limited());
        assert!(!LlmError::api("gemini", 500, "boom").is_rate_limited());
        assert!(!LlmError::configuration("missing key").is_rate_limited());
    }

    #[test]
    fn test_api_error_display() {
        let err = LlmError::api("openai", 401, "invalid key");
        assert_eq!(err.to_string(), "openai API returned 401: invalid key");
    }
}

//! Provider client configuration

use crate::error::{LlmError, LlmResult};
use std::time::Duration;
use url::Url;

/// Default Gemini REST endpoint
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Ollama OpenAI-compatible endpoint
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Which provider wire format to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Generative Language API
    Gemini,
    /// OpenAI chat completions API
    OpenAi,
    /// Ollama through its OpenAI-compatible endpoint
    Ollama,
}

impl ProviderKind {
    /// Provider name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Ollama => "llama3.1",
        }
    }

    fn default_embedding_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-embedding-001",
            ProviderKind::OpenAi => "text-embedding-3-small",
            ProviderKind::Ollama => "nomic-embed-text",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => GEMINI_BASE_URL,
            ProviderKind::OpenAi => OPENAI_BASE_URL,
            ProviderKind::Ollama => OLLAMA_BASE_URL,
        }
    }

    fn api_key_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(LlmError::configuration(format!(
                "unknown provider '{}', expected gemini, openai or ollama",
                other
            ))),
        }
    }
}

/// Settings for building a provider client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Wire format and defaults
    pub provider: ProviderKind,

    /// API key; optional for local providers
    pub api_key: Option<String>,

    /// Chat model
    pub model: String,

    /// Embedding model
    pub embedding_model: String,

    /// Endpoint root, without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Defaults for `provider`
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            embedding_model: provider.default_embedding_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Gemini preset
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::Gemini).with_api_key(api_key)
    }

    /// OpenAI preset
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::OpenAi).with_api_key(api_key)
    }

    /// Ollama preset
    pub fn ollama() -> Self {
        Self::new(ProviderKind::Ollama)
    }

    /// Load settings from the environment, reading `.env` first if present
    ///
    /// Recognised variables: `RAGENT_PROVIDER`, `GEMINI_API_KEY`, `OPENAI_API_KEY`,
    /// `RAGENT_MODEL`, `RAGENT_EMBEDDING_MODEL`, `RAGENT_BASE_URL`, `RAGENT_TIMEOUT_SECS`.
    pub fn from_env() -> LlmResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> LlmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("RAGENT_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::Gemini,
        };

        let mut config = Self::new(provider);

        if let Some(var) = provider.api_key_var() {
            let key = lookup(var).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                LlmError::configuration(format!("{} is missing from the environment", var))
            })?;
            config.api_key = Some(key);
        }

        if let Some(model) = lookup("RAGENT_MODEL") {
            config.model = model;
        }
        if let Some(model) = lookup("RAGENT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(url) = lookup("RAGENT_BASE_URL") {
            config = config.with_base_url(&url)?;
        }
        if let Some(secs) = lookup("RAGENT_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                LlmError::configuration(format!("RAGENT_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the endpoint root
    pub fn with_base_url(mut self, base_url: &str) -> LlmResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| {
            LlmError::configuration(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint root as a string without trailing slash
    pub fn endpoint(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    /// API key or a configuration error naming the missing variable
    pub fn require_api_key(&self) -> LlmResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            LlmError::configuration(format!("{} provider requires an API key", self.provider.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_gemini() {
        let config = ClientConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.embedding_model, "gemini-embedding-001");
        assert_eq!(config.endpoint(), GEMINI_BASE_URL);
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = ClientConfig::from_lookup(lookup_from(&[("RAGENT_PROVIDER", "openai")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("RAGENT_PROVIDER", "ollama"),
            ("RAGENT_MODEL", "qwen2.5"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "qwen2.5");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("RAGENT_BASE_URL", "http://127.0.0.1:9000/v1beta/"),
            ("RAGENT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/v1beta");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[("RAGENT_PROVIDER", "bard")])).unwrap_err();
        assert!(matches!(err, LlmError::Configuration { .. }));
    }
}

//! Agent configuration

use crate::error::{RagentError, RagentResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// How an agent keeps history between calls to `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    /// Every run starts from the system prompt alone
    Stateless,
    /// Runs share one conversation
    #[default]
    Stateful,
}

/// Settings for an [`Agent`](super::Agent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// First turn of every conversation
    pub system_prompt: String,

    /// Maximum tool round-trips per exchange
    pub max_steps: usize,

    /// History handling between runs
    pub conversation_mode: ConversationMode,

    /// Non-system turns sent to the model, `None` for the whole history
    pub history_window: Option<usize>,

    /// Matches injected by the retriever
    pub retrieval_top_k: usize,

    /// Log prompts and answers at info level
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_steps: 10,
            conversation_mode: ConversationMode::default(),
            history_window: None,
            retrieval_top_k: 1,
            verbose: false,
        }
    }
}

impl AgentConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then an optional TOML file, then `RAGENT_AGENT__*` variables
    ///
    /// `RAGENT_AGENT__MAX_STEPS=5` sets `max_steps`, and so on.
    pub fn load(path: Option<&Path>) -> RagentResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading variables from `env` instead of the process
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> RagentResult<Self> {
        let defaults = config::Config::try_from(&Self::default()).map_err(config_error)?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix("RAGENT_AGENT")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the agent loop cannot run with
    pub fn validate(&self) -> RagentResult<()> {
        if self.max_steps == 0 {
            return Err(RagentError::configuration("max_steps must be at least 1"));
        }
        if self.history_window == Some(0) {
            return Err(RagentError::configuration("history_window must be at least 1"));
        }
        if self.retrieval_top_k == 0 {
            return Err(RagentError::configuration("retrieval_top_k must be at least 1"));
        }
        Ok(())
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the step limit
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the conversation mode
    pub fn with_conversation_mode(mut self, mode: ConversationMode) -> Self {
        self.conversation_mode = mode;
        self
    }

    /// Bound the history sent to the model
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = Some(turns);
        self
    }

    /// Set how many retrieved matches are injected
    pub fn with_retrieval_top_k(mut self, top_k: usize) -> Self {
        self.retrieval_top_k = top_k;
        self
    }

    /// Toggle verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn config_error(e: config::ConfigError) -> RagentError {
    RagentError::configuration(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.retrieval_top_k, 1);
        assert_eq!(config.conversation_mode, ConversationMode::Stateful);
        assert!(config.history_window.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
system_prompt = "You are Jarvis."
max_steps = 5
conversation_mode = "stateless"
history_window = 12
"#
        )
        .unwrap();

        let config = AgentConfig::load_with_env(Some(file.path()), Some(config::Map::new())).unwrap();
        assert_eq!(config.system_prompt, "You are Jarvis.");
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.conversation_mode, ConversationMode::Stateless);
        assert_eq!(config.history_window, Some(12));
        assert_eq!(config.retrieval_top_k, 1);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_steps = 5\nverbose = false").unwrap();

        let env = config::Map::from([
            ("RAGENT_AGENT__MAX_STEPS".to_string(), "4".to_string()),
            ("RAGENT_AGENT__VERBOSE".to_string(), "true".to_string()),
            ("RAGENT_AGENT__CONVERSATION_MODE".to_string(), "stateless".to_string()),
            ("UNRELATED__MAX_STEPS".to_string(), "99".to_string()),
        ]);

        let config = AgentConfig::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(config.max_steps, 4);
        assert!(config.verbose);
        assert_eq!(config.conversation_mode, ConversationMode::Stateless);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_zero_from_environment_is_rejected() {
        let env = config::Map::from([("RAGENT_AGENT__MAX_STEPS".to_string(), "0".to_string())]);
        let err = AgentConfig::load_with_env(None, Some(env)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = AgentConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AgentConfig::default().with_max_steps(0).validate().unwrap_err();
        assert!(err.to_string().contains("max_steps"));
        assert!(AgentConfig::default().with_history_window(0).validate().is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = AgentConfig::new()
            .with_system_prompt("sys")
            .with_max_steps(3)
            .with_conversation_mode(ConversationMode::Stateless)
            .with_history_window(8)
            .with_retrieval_top_k(2)
            .with_verbose(true);
        assert_eq!(config.system_prompt, "sys");
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.history_window, Some(8));
        assert_eq!(config.retrieval_top_k, 2);
        assert!(config.verbose);
    }
}

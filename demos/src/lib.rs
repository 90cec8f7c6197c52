//! Shared plumbing for the demo binaries

use clap::Args;
use ragent::llm::{Client, ClientConfig};
use ragent::rag::AgentResponse;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

/// Options every demo accepts
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Chat model to use instead of the provider default
    #[arg(long, env = "RAGENT_MODEL")]
    pub model: Option<String>,
}

impl ModelArgs {
    /// Client settings from the environment with the model override applied
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let config = ClientConfig::from_env()?;
        Ok(match &self.model {
            Some(model) => config.with_model(model),
            None => config,
        })
    }

    /// Provider client from the environment with the model override applied
    pub fn client(&self) -> anyhow::Result<Client> {
        Ok(Client::from_config(self.client_config()?)?)
    }
}

/// Install a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

/// Line-oriented prompt on stdin
pub struct Repl {
    lines: Lines<BufReader<Stdin>>,
}

impl Repl {
    /// Read from the process's stdin
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and read one line
    ///
    /// Returns `None` at end of input or when the user types `exit`.
    pub async fn read(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        match self.lines.next_line().await? {
            Some(line) if line.trim().eq_ignore_ascii_case("exit") => Ok(None),
            Some(line) => Ok(Some(line.trim().to_string())),
            None => Ok(None),
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

/// Print every tool call an exchange made
pub fn print_tool_log(response: &AgentResponse) {
    for record in &response.tool_calls {
        println!(
            "   [Tool Call #{}] {}({})",
            record.step,
            record.request.name,
            serde_json::Value::Object(record.request.arguments.clone())
        );
    }
}

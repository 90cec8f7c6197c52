//! Scripted completion client for tests and offline demos

use crate::client::{Completion, CompletionClient};
use crate::error::{LlmError, LlmResult};
use crate::message::{ToolCallRequest, Turn};
use crate::tool::ToolDefinition;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A recorded `complete` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Conversation as sent to the model
    pub conversation: Vec<Turn>,

    /// Names of the tools offered to the model
    pub tool_names: Vec<String>,
}

enum Scripted {
    Completion(Completion),
    Failure(String),
}

/// Completion client that replays queued answers
///
/// Answers are returned in the order they were queued. Once the queue is empty the
/// fallback answer is repeated, or a provider error is returned if none was set.
pub struct ScriptedClient {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Option<Completion>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    /// Create an empty script
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text answer
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.queue
            .lock()
            .push_back(Scripted::Completion(Completion::Text(text.into())));
        self
    }

    /// Queue a tool-call answer
    pub fn then_tool_calls(self, calls: Vec<ToolCallRequest>) -> Self {
        self.queue
            .lock()
            .push_back(Scripted::Completion(Completion::ToolCalls(calls)));
        self
    }

    /// Queue a provider failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.queue.lock().push_back(Scripted::Failure(message.into()));
        self
    }

    /// Answer used once the queue runs dry
    pub fn with_fallback(mut self, completion: Completion) -> Self {
        self.fallback = Some(completion);
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, conversation: &[Turn], tools: &[ToolDefinition]) -> LlmResult<Completion> {
        self.calls.lock().push(RecordedCall {
            conversation: conversation.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        let next = self.queue.lock().pop_front();
        match next {
            Some(Scripted::Completion(completion)) => Ok(completion),
            Some(Scripted::Failure(message)) => Err(LlmError::api("scripted", 503, message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::malformed("scripted", "script exhausted")),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

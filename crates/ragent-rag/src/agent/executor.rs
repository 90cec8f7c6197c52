//! Bounded tool-use loop for one exchange

use super::memory::ConversationState;
use super::tools::ToolRegistry;
use crate::error::{RagentError, RagentResult};
use ragent_llm::{generate_call_id, Completion, CompletionClient, ToolCallRequest};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Marker appended to the partial text of an aborted exchange
pub const STEP_LIMIT_MARKER: &str = "[step limit exceeded]";

/// States of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the model's next completion
    AwaitingModel,
    /// Running the tool calls the model asked for
    ExecutingTools,
    /// The model produced a final answer
    Done,
    /// The step limit was hit
    Aborted,
}

/// One executed tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    /// Cycle the call ran in, starting at 1
    pub step: usize,

    /// What the model asked for
    pub request: ToolCallRequest,

    /// Content of the tool-result turn
    pub output: String,

    /// Whether the call failed
    pub is_error: bool,
}

/// How an exchange ended
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// The model answered
    Done {
        /// Final answer
        text: String,
    },
    /// The loop gave up after too many tool round-trips
    Aborted {
        /// Latest tool output of the exchange, possibly empty
        partial_text: String,
        /// Why the loop stopped
        reason: String,
    },
}

/// Result of one exchange
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// Final state
    pub outcome: AgentOutcome,

    /// Number of tool round-trips performed
    pub steps: usize,

    /// Every tool call executed, in order
    pub tool_calls: Vec<ToolCallRecord>,
}

impl AgentResponse {
    /// Text to show the user; aborted exchanges end with [`STEP_LIMIT_MARKER`]
    pub fn text(&self) -> String {
        match &self.outcome {
            AgentOutcome::Done { text } => text.clone(),
            AgentOutcome::Aborted { partial_text, .. } if partial_text.is_empty() => {
                STEP_LIMIT_MARKER.to_string()
            }
            AgentOutcome::Aborted { partial_text, .. } => {
                format!("{partial_text}\n{STEP_LIMIT_MARKER}")
            }
        }
    }

    /// Whether the model produced a final answer
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, AgentOutcome::Done { .. })
    }

    /// Whether the step limit ended the exchange
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, AgentOutcome::Aborted { .. })
    }

    /// Terminal state
    pub fn state(&self) -> LoopState {
        match self.outcome {
            AgentOutcome::Done { .. } => LoopState::Done,
            AgentOutcome::Aborted { .. } => LoopState::Aborted,
        }
    }
}

/// Drives one exchange between the model and the tools
///
/// The conversation must already end with the new user turn. Tool calls run one at
/// a time in the order the model listed them. After `max_steps` tool round-trips a
/// further tool request is not executed and the exchange is aborted.
pub struct AgentLoop<'a> {
    client: &'a dyn CompletionClient,
    tools: &'a ToolRegistry,
    max_steps: usize,
    history_window: Option<usize>,
}

impl<'a> AgentLoop<'a> {
    /// Create a loop over `client` and `tools`
    pub fn new(client: &'a dyn CompletionClient, tools: &'a ToolRegistry, max_steps: usize) -> Self {
        Self {
            client,
            tools,
            max_steps,
            history_window: None,
        }
    }

    /// Send only a sliding window of the history to the model
    pub fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    /// Run until the model answers or the step limit is hit
    ///
    /// Provider failures end the exchange with an error; tool failures are fed
    /// back to the model.
    pub async fn run(&self, conversation: &mut ConversationState) -> RagentResult<AgentResponse> {
        if conversation.is_empty() {
            return Err(RagentError::conversation("exchange started without a user turn"));
        }

        let definitions = self.tools.definitions();
        let mut state = LoopState::AwaitingModel;
        let mut steps = 0;
        let mut records: Vec<ToolCallRecord> = Vec::new();

        loop {
            debug!(?state, step = steps, max_steps = self.max_steps, "Agent loop step");

            let view = conversation.window(self.history_window);
            debug!(
                turn_count = view.len(),
                tool_count = definitions.len(),
                model = self.client.model_name(),
                "Calling model"
            );

            let completion = self
                .client
                .complete(&view, &definitions)
                .await
                .map_err(|e| RagentError::provider("complete", e))?;

            let calls = match completion {
                Completion::ToolCalls(calls) if !calls.is_empty() => calls,
                Completion::ToolCalls(_) => {
                    return self.finish(conversation, String::new(), steps, records);
                }
                Completion::Text(text) => {
                    return self.finish(conversation, text, steps, records);
                }
            };

            if steps >= self.max_steps {
                error!(
                    max_steps = self.max_steps,
                    requested = calls.len(),
                    "Agent exceeded maximum steps without reaching final answer"
                );
                let partial_text = records.last().map(|r| r.output.clone()).unwrap_or_default();
                return Ok(AgentResponse {
                    outcome: AgentOutcome::Aborted {
                        partial_text,
                        reason: format!("step limit of {} exceeded", self.max_steps),
                    },
                    steps,
                    tool_calls: records,
                });
            }

            steps += 1;
            state = LoopState::ExecutingTools;
            let calls = with_unique_ids(calls);
            info!(
                step = steps,
                tool_count = calls.len(),
                tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Agent requesting tool calls"
            );
            debug!(?state, step = steps, "Agent loop step");

            conversation.push_tool_calls(calls.clone())?;

            for call in calls {
                let result = self.tools.execute_call(&call).await;
                let output = result.render();
                debug!(tool = %call.name, output_length = output.len(), "Tool execution completed");

                conversation.push_tool_result(&call.id, &call.name, output.clone())?;
                records.push(ToolCallRecord {
                    step: steps,
                    is_error: result.is_error(),
                    request: call,
                    output,
                });
            }

            state = LoopState::AwaitingModel;
        }
    }

    fn finish(
        &self,
        conversation: &mut ConversationState,
        text: String,
        steps: usize,
        tool_calls: Vec<ToolCallRecord>,
    ) -> RagentResult<AgentResponse> {
        conversation.push_assistant(text.clone())?;
        info!(steps, answer_length = text.len(), "Agent generated final answer");

        Ok(AgentResponse {
            outcome: AgentOutcome::Done { text },
            steps,
            tool_calls,
        })
    }
}

/// Give calls without an id, or with an id already used in the batch, a fresh one
fn with_unique_ids(calls: Vec<ToolCallRequest>) -> Vec<ToolCallRequest> {
    let mut seen = HashSet::new();
    calls
        .into_iter()
        .map(|mut call| {
            if call.id.is_empty() || !seen.insert(call.id.clone()) {
                call.id = generate_call_id();
                seen.insert(call.id.clone());
            }
            call
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tools::builtin;
    use ragent_llm::{Role, ScriptedClient};
    use serde_json::json;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("ragent_rag=debug")
            .with_test_writer()
            .try_init();
    }

    fn add_call(id: &str, a: i64, b: i64) -> ToolCallRequest {
        ToolCallRequest::from_json(id, "add", json!({ "a": a, "b": b }))
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with_tool(builtin::add()).unwrap()
    }

    fn conversation(question: &str) -> ConversationState {
        let mut state = ConversationState::with_system_prompt("You are a calculator.");
        state.push_user(question).unwrap();
        state
    }

    fn tool_results(state: &ConversationState) -> Vec<&ragent_llm::Turn> {
        state.turns().iter().filter(|t| t.role == Role::ToolResult).collect()
    }

    #[tokio::test]
    async fn test_plain_text_answer_needs_no_tools() {
        let client = ScriptedClient::new().then_text("Hello!");
        let tools = registry();
        let mut state = conversation("hi");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        assert!(response.is_done());
        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.steps, 0);
        assert_eq!(state.last().unwrap().role, Role::Assistant);
        assert_eq!(client.calls()[0].tool_names, vec!["add"]);
    }

    #[tokio::test]
    async fn test_tool_round_trip_feeds_result_back() {
        init_tracing();
        let client = ScriptedClient::new()
            .then_tool_calls(vec![add_call("call_1", 2, 3)])
            .then_text("2 + 3 = 5");
        let tools = registry();
        let mut state = conversation("What is 2 + 3?");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        assert_eq!(response.text(), "2 + 3 = 5");
        assert_eq!(response.steps, 1);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].output, "5");

        let results = tool_results(&state);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(results[0].content, "5");

        // the second model call saw the tool result
        let second = &client.calls()[1].conversation;
        assert_eq!(second.last().unwrap().content, "5");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_and_loop_continues() {
        let client = ScriptedClient::new()
            .then_tool_calls(vec![ToolCallRequest::from_json("call_1", "multiply", json!({}))])
            .then_text("I cannot multiply.");
        let tools = registry();
        let mut state = conversation("2 * 3?");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        assert!(response.is_done());
        let results = tool_results(&state);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "Error: tool not found: multiply");
        assert!(response.tool_calls[0].is_error);
    }

    #[tokio::test]
    async fn test_step_limit_aborts_after_exactly_max_steps() {
        init_tracing();
        let client = ScriptedClient::new()
            .with_fallback(Completion::ToolCalls(vec![add_call("call_x", 1, 1)]));
        let tools = registry();
        let mut state = conversation("loop forever");

        let response = AgentLoop::new(&client, &tools, 3).run(&mut state).await.unwrap();

        assert!(response.is_aborted());
        assert_eq!(response.state(), LoopState::Aborted);
        assert_eq!(response.steps, 3);
        assert_eq!(response.tool_calls.len(), 3);
        assert_eq!(tool_results(&state).len(), 3);
        // three executed cycles plus the request that was refused
        assert_eq!(client.call_count(), 4);
        assert_eq!(response.text(), format!("2\n{STEP_LIMIT_MARKER}"));

        // the refused request left nothing unanswered behind
        assert!(state.pending_tool_calls().is_empty());
        state.push_user("next question").unwrap();
    }

    #[tokio::test]
    async fn test_missing_parameter_becomes_validation_result() {
        let client = ScriptedClient::new()
            .then_tool_calls(vec![ToolCallRequest::from_json("call_1", "add", json!({ "a": 2 }))])
            .then_text("I need both numbers.");
        let tools = registry();
        let mut state = conversation("2 + ?");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        assert!(response.is_done());
        assert_eq!(
            tool_results(&state)[0].content,
            "Error: invalid argument 'b' for tool 'add': required parameter is missing"
        );
    }

    #[tokio::test]
    async fn test_multiple_calls_run_in_order() {
        let client = ScriptedClient::new()
            .then_tool_calls(vec![add_call("c1", 1, 2), add_call("c2", 10, 20)])
            .then_text("3 and 30");
        let tools = registry();
        let mut state = conversation("two sums");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        let outputs: Vec<&str> = response.tool_calls.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, vec!["3", "30"]);
        assert!(response.tool_calls.iter().all(|r| r.step == 1));
    }

    #[tokio::test]
    async fn test_provider_failure_is_returned() {
        let client = ScriptedClient::new().then_fail("quota exhausted");
        let tools = registry();
        let mut state = conversation("hi");

        let err = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap_err();
        assert!(err.is_provider());
    }

    #[tokio::test]
    async fn test_history_window_limits_model_view() {
        let client = ScriptedClient::new().then_text("ok");
        let tools = registry();
        let mut state = ConversationState::with_system_prompt("sys");
        for i in 0..5 {
            state.push_user(format!("q{i}")).unwrap();
            state.push_assistant(format!("a{i}")).unwrap();
        }
        state.push_user("latest").unwrap();

        AgentLoop::new(&client, &tools, 5)
            .with_history_window(Some(2))
            .run(&mut state)
            .await
            .unwrap();

        let sent = &client.calls()[0].conversation;
        let contents: Vec<&str> = sent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "a4", "latest"]);
    }

    #[tokio::test]
    async fn test_history_window_keeps_question_during_tool_round_trip() {
        init_tracing();
        let client = ScriptedClient::new()
            .then_tool_calls(vec![add_call("call_1", 2, 3)])
            .then_text("5");
        let tools = registry();
        let mut state = ConversationState::with_system_prompt("sys");
        state.push_user("earlier").unwrap();
        state.push_assistant("noted").unwrap();
        state.push_user("What is 2 + 3?").unwrap();

        let response = AgentLoop::new(&client, &tools, 5)
            .with_history_window(Some(2))
            .run(&mut state)
            .await
            .unwrap();
        assert_eq!(response.text(), "5");

        let sent = &client.calls()[1].conversation;
        let roles: Vec<Role> = sent.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::ToolResult]
        );
        assert_eq!(sent[1].content, "What is 2 + 3?");
    }

    #[tokio::test]
    async fn test_duplicate_call_ids_are_replaced() {
        let client = ScriptedClient::new()
            .then_tool_calls(vec![add_call("same", 1, 1), add_call("same", 2, 2)])
            .then_text("done");
        let tools = registry();
        let mut state = conversation("sums");

        let response = AgentLoop::new(&client, &tools, 5).run(&mut state).await.unwrap();

        assert_eq!(response.tool_calls[0].request.id, "same");
        assert_ne!(response.tool_calls[1].request.id, "same");
        assert_eq!(tool_results(&state).len(), 2);
    }
}

//! Append-only conversation history

use crate::error::{RagentError, RagentResult};
use ragent_llm::{Role, ToolCallRequest, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Ordered turns of one conversation
///
/// Turns are only ever appended. A tool-result turn is accepted only when it
/// answers an open call of the assistant turn that directly precedes the current
/// run of tool results, and no other turn may be appended while such calls are
/// still unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    id: Uuid,
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
        }
    }

    /// Create a conversation starting with a system prompt
    ///
    /// A blank prompt adds no turn.
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut state = Self::new();
        let prompt = prompt.into();
        if !prompt.trim().is_empty() {
            state.turns.push(Turn::system(prompt));
        }
        state
    }

    /// Conversation identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a turn, enforcing the tool-result ordering rule
    pub fn push(&mut self, turn: Turn) -> RagentResult<()> {
        if turn.role == Role::ToolResult {
            self.check_tool_result(&turn)?;
        } else {
            let pending = self.pending_tool_calls();
            if !pending.is_empty() {
                return Err(RagentError::conversation(format!(
                    "cannot append a {} turn while tool calls are unanswered: {}",
                    turn.role,
                    pending.join(", ")
                )));
            }
        }

        debug!(
            conversation_id = %self.id,
            role = %turn.role,
            position = self.turns.len(),
            "Appended turn"
        );
        self.turns.push(turn);
        Ok(())
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) -> RagentResult<()> {
        self.push(Turn::user(content))
    }

    /// Append an assistant text turn
    pub fn push_assistant(&mut self, content: impl Into<String>) -> RagentResult<()> {
        self.push(Turn::assistant(content))
    }

    /// Append an assistant turn requesting tool calls
    pub fn push_tool_calls(&mut self, calls: Vec<ToolCallRequest>) -> RagentResult<()> {
        self.push(Turn::assistant_tool_calls(calls))
    }

    /// Append the result of one requested call
    pub fn push_tool_result(
        &mut self,
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> RagentResult<()> {
        self.push(Turn::tool_result(call_id, tool_name, content))
    }

    fn check_tool_result(&self, turn: &Turn) -> RagentResult<()> {
        let call_id = turn
            .tool_call_id
            .as_deref()
            .ok_or_else(|| RagentError::conversation("tool-result turn has no call id"))?;

        if self.pending_tool_calls().contains(&call_id) {
            Ok(())
        } else {
            Err(RagentError::conversation(format!(
                "tool result '{call_id}' does not answer an open call of the preceding assistant turn"
            )))
        }
    }

    /// Call ids of the latest assistant request that have no result yet
    pub fn pending_tool_calls(&self) -> Vec<&str> {
        let mut answered = HashSet::new();

        for turn in self.turns.iter().rev() {
            match turn.role {
                Role::ToolResult => {
                    if let Some(id) = turn.tool_call_id.as_deref() {
                        answered.insert(id);
                    }
                }
                Role::Assistant if turn.has_tool_calls() => {
                    return turn
                        .tool_calls
                        .iter()
                        .map(|c| c.id.as_str())
                        .filter(|id| !answered.contains(id))
                        .collect();
                }
                _ => break,
            }
        }

        Vec::new()
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns appended at or after `position`
    pub fn since(&self, position: usize) -> &[Turn] {
        &self.turns[position.min(self.turns.len())..]
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// View sent to the model, bounded to roughly `limit` non-system turns
    ///
    /// Leading system turns are always kept. The window is widened backwards
    /// when it would otherwise start on a tool result cut off from its request,
    /// and it never starts after the most recent user turn, so the question of
    /// the running exchange stays in view. `None` returns the whole history.
    pub fn window(&self, limit: Option<usize>) -> Vec<Turn> {
        let Some(limit) = limit else {
            return self.turns.clone();
        };

        let system_prefix = self
            .turns
            .iter()
            .take_while(|t| t.role == Role::System)
            .count();
        let body = &self.turns[system_prefix..];

        let mut start = body.len().saturating_sub(limit);
        while start > 0 && body[start].role == Role::ToolResult {
            start -= 1;
        }
        if let Some(question) = body.iter().rposition(|t| t.role == Role::User) {
            start = start.min(question);
        }

        self.turns[..system_prefix]
            .iter()
            .chain(&body[start..])
            .cloned()
            .collect()
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

//! Core Agent trait definition

use crate::{ChatMessage, Context, Result, TerminationCondition};
use async_trait::async_trait;

/// A named conversational participant
///
/// Agents take part in two-party exchanges. The full transcript is handed to
/// [`Agent::reply`] on every turn; implementations decide how to map it onto
/// their backend (an LLM, a code executor, a nested workflow).
#[async_trait]
pub trait Agent: Send + Sync {
    /// Get the agent's name
    ///
    /// Names identify the sender of every [`ChatMessage`], so they must be
    /// unique within one exchange.
    fn name(&self) -> &str;

    /// Produce the next message given the conversation so far
    async fn reply(&self, history: &[ChatMessage], context: &mut Context) -> Result<String>;

    /// Condition under which a message received by this agent ends the exchange
    fn termination(&self) -> TerminationCondition {
        TerminationCondition::default()
    }

    /// Condense a transcript according to `prompt`
    ///
    /// Returns `Ok(None)` when the agent has no model to reflect with.
    async fn reflect(&self, _history: &[ChatMessage], _prompt: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

//! Code-executing user proxy
//!
//! The proxy stands in for the human operator. It never calls a model: it
//! looks for code in recent messages from its counterpart, runs it and sends
//! back the execution log.

use crate::code::{CodeExecutor, ExecutionResult, extract_code_blocks};
use async_trait::async_trait;
use finsight_core::{Agent, ChatMessage, Context, Result, TerminationCondition};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Configuration for a user proxy
#[derive(Debug, Clone)]
pub struct UserProxyConfig {
    /// How many of the counterpart's latest messages to scan for code
    pub last_n_messages: usize,

    /// Reply sent when no code is found
    pub default_reply: String,

    /// Condition on received messages that ends the exchange
    pub termination: TerminationCondition,
}

impl Default for UserProxyConfig {
    fn default() -> Self {
        Self {
            last_n_messages: 3,
            default_reply: "No code block found. Continue the task, or reply TERMINATE if everything is done."
                .to_string(),
            termination: TerminationCondition::ends_with_terminate(),
        }
    }
}

/// An agent that executes code written by the other party
pub struct UserProxyAgent {
    name: String,
    executor: Arc<dyn CodeExecutor>,
    config: UserProxyConfig,
}

impl UserProxyAgent {
    /// Create a new user proxy
    pub fn new(
        name: impl Into<String>,
        executor: Arc<dyn CodeExecutor>,
        config: UserProxyConfig,
    ) -> Self {
        Self {
            name: name.into(),
            executor,
            config,
        }
    }

    /// Get the proxy configuration
    pub fn config(&self) -> &UserProxyConfig {
        &self.config
    }
}

#[async_trait]
impl Agent for UserProxyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        skip(self, history, context),
        fields(
            agent = %self.name,
            run_id = %context.run_id().unwrap_or("-"),
            stage = %context.stage().unwrap_or("-"),
        )
    )]
    async fn reply(&self, history: &[ChatMessage], context: &mut Context) -> Result<String> {
        let blocks = history
            .iter()
            .rev()
            .filter(|m| !m.is_from(&self.name))
            .take(self.config.last_n_messages)
            .map(|m| extract_code_blocks(&m.content))
            .find(|blocks| !blocks.is_empty());

        let Some(blocks) = blocks else {
            return Ok(self.config.default_reply.clone());
        };

        info!(blocks = blocks.len(), "Executing code blocks");
        let result = match self.executor.execute(&blocks).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Code executor failed");
                ExecutionResult {
                    exit_code: 1,
                    output: e.to_string(),
                }
            }
        };
        Ok(result.to_reply())
    }

    fn termination(&self) -> TerminationCondition {
        self.config.termination.clone()
    }
}

//! LLM-backed conversational agent

use async_trait::async_trait;
use finsight_core::{Agent, ChatMessage, Context, Error, Result, TerminationCondition};
use finsight_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Configuration for an LLM agent
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling, provider default when `None`
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are a helpful AI assistant.".to_string(),
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// An agent whose replies come from a chat-completion model
///
/// The transcript is mapped from the agent's point of view: its own messages
/// become `assistant` turns and everything else becomes `user` turns.
///
/// # Example
///
/// ```no_run
/// use finsight_runtime::{LlmAgent, LlmConfig};
/// use finsight_core::{Agent, ChatMessage, Context};
/// # use std::sync::Arc;
///
/// # async fn example(provider: Arc<dyn finsight_llm::LLMProvider>) -> finsight_core::Result<()> {
/// let config = LlmConfig {
///     system_prompt: "You are a critic.".to_string(),
///     ..LlmConfig::default()
/// };
/// let critic = LlmAgent::new(provider, config, "Critic");
///
/// let history = vec![ChatMessage::new("writer", "# Draft")];
/// let feedback = critic.reply(&history, &mut Context::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct LlmAgent {
    provider: Arc<dyn LLMProvider>,
    config: LlmConfig,
    name: String,
    termination: TerminationCondition,
}

impl LlmAgent {
    /// Create a new LLM agent
    pub fn new(provider: Arc<dyn LLMProvider>, config: LlmConfig, name: impl Into<String>) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
            termination: TerminationCondition::default(),
        }
    }

    /// Replace the termination condition
    pub fn with_termination(mut self, termination: TerminationCondition) -> Self {
        self.termination = termination;
        self
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn to_messages(&self, history: &[ChatMessage]) -> Vec<Message> {
        history
            .iter()
            .map(|m| {
                if m.is_from(&self.name) {
                    Message::assistant(m.content.clone())
                } else {
                    Message::user(m.content.clone())
                }
            })
            .collect()
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .system(self.config.system_prompt.clone())
            .max_tokens(self.config.max_tokens)
            .maybe_temperature(self.config.temperature)
            .build();

        let response =
            self.provider
                .complete(request)
                .await
                .map_err(|e| Error::CompletionFailed {
                    agent: self.name.clone(),
                    detail: e.to_string(),
                })?;

        debug!(
            agent = %self.name,
            output_tokens = response.usage.output_tokens,
            "Completion received"
        );
        Ok(response.message.content)
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        skip(self, history, context),
        fields(
            agent = %self.name,
            turns = history.len(),
            run_id = %context.run_id().unwrap_or("-"),
            stage = %context.stage().unwrap_or("-"),
        )
    )]
    async fn reply(&self, history: &[ChatMessage], context: &mut Context) -> Result<String> {
        self.complete(self.to_messages(history)).await
    }

    fn termination(&self) -> TerminationCondition {
        self.termination.clone()
    }

    async fn reflect(&self, history: &[ChatMessage], prompt: &str) -> Result<Option<String>> {
        let mut messages = self.to_messages(history);
        messages.push(Message::user(prompt));
        self.complete(messages).await.map(Some)
    }
}

//! Agent wrapper that runs a review pipeline on trigger

use crate::review::{ReviewPipeline, ReviewReport};
use async_trait::async_trait;
use finsight_core::{Agent, ChatMessage, Context, Result, TerminationCondition};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Wraps an agent so that messages from a trigger agent are answered by a
/// review pipeline instead of the wrapped agent
///
/// Messages from anyone else go to the wrapped agent unchanged. Every report
/// produced is kept and can be read back with [`ReviewedAgent::reviews`].
///
/// # Example
///
/// ```no_run
/// use finsight_workflow::{ReviewPipeline, ReviewedAgent};
/// # use std::sync::Arc;
///
/// # fn example(critic: Arc<dyn finsight_core::Agent>, pipeline: ReviewPipeline) {
/// let critic = ReviewedAgent::new(critic, pipeline, "writer");
/// # }
/// ```
pub struct ReviewedAgent {
    inner: Arc<dyn Agent>,
    pipeline: ReviewPipeline,
    trigger: String,
    reports: Mutex<Vec<ReviewReport>>,
}

impl ReviewedAgent {
    /// Create a new reviewed agent
    pub fn new(inner: Arc<dyn Agent>, pipeline: ReviewPipeline, trigger: impl Into<String>) -> Self {
        Self {
            inner,
            pipeline,
            trigger: trigger.into(),
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Name of the agent whose messages trigger a review
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Reports produced so far, oldest first
    pub fn reviews(&self) -> Vec<ReviewReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Agent for ReviewedAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn reply(&self, history: &[ChatMessage], context: &mut Context) -> Result<String> {
        let Some(last) = history.last().filter(|m| m.is_from(&self.trigger)) else {
            return self.inner.reply(history, context).await;
        };

        info!(agent = self.name(), trigger = %self.trigger, "Running nested review");
        let report = self
            .pipeline
            .review(self.inner.clone(), &last.content, context)
            .await?;
        let reply = report.meta_review.clone();
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
        Ok(reply)
    }

    fn termination(&self) -> TerminationCondition {
        self.inner.termination()
    }

    async fn reflect(&self, history: &[ChatMessage], prompt: &str) -> Result<Option<String>> {
        self.inner.reflect(history, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_llm::testing::ScriptedProvider;
    use finsight_runtime::{LlmAgent, LlmConfig};

    fn agent(provider: &Arc<ScriptedProvider>, name: &str) -> Arc<dyn Agent> {
        let config = LlmConfig {
            system_prompt: name.to_string(),
            ..LlmConfig::default()
        };
        Arc::new(LlmAgent::new(provider.clone(), config, name))
    }

    fn reviewed(provider: &Arc<ScriptedProvider>) -> ReviewedAgent {
        let pipeline = ReviewPipeline::builder()
            .reviewer(agent(provider, "Legal_Reviewer"))
            .meta_reviewer(agent(provider, "Meta_Reviewer"))
            .build()
            .unwrap();
        ReviewedAgent::new(agent(provider, "Critic"), pipeline, "writer")
    }

    #[tokio::test]
    async fn test_trigger_runs_pipeline() {
        let provider = Arc::new(ScriptedProvider::from_replies([
            "legal notes",
            "{\"reviewer\": \"Legal\", \"review\": \"add disclaimer\"}",
            "meta: add a disclaimer",
        ]));
        let critic = reviewed(&provider);

        let history = vec![
            ChatMessage::new("Critic", "Write the report"),
            ChatMessage::new("writer", "# Draft"),
        ];
        let reply = critic.reply(&history, &mut Context::new()).await.unwrap();

        assert_eq!(reply, "meta: add a disclaimer");
        let reports = critic.reviews();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reviews[0].review, "add disclaimer");
    }

    #[tokio::test]
    async fn test_other_senders_reach_inner_agent() {
        let provider = Arc::new(ScriptedProvider::from_replies(["plain critique"]));
        let critic = reviewed(&provider);

        let history = vec![ChatMessage::new("someone_else", "hello")];
        let reply = critic.reply(&history, &mut Context::new()).await.unwrap();

        assert_eq!(reply, "plain critique");
        assert!(critic.reviews().is_empty());
        assert_eq!(critic.name(), "Critic");
    }
}

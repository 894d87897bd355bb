//! Nested review pipeline
//!
//! Reviewers are consulted one at a time, each in a single-turn exchange with
//! the reviewing agent, which condenses the answer into a small JSON object.
//! A meta-reviewer then receives every condensed review as carryover and
//! writes the final recommendation.

use crate::parse::parse_review;
use crate::sequence::{ChatSequence, ChatTask};
use finsight_core::{Agent, Context, Error, Result};
use finsight_runtime::SummaryMethod;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Prompt used to condense each reviewer's answer
pub const REVIEW_SUMMARY_PROMPT: &str =
    "Return review into a JSON object only: {'reviewer': '', 'review': ''}";

/// Message sent to the meta-reviewer
pub const META_REVIEW_MESSAGE: &str =
    "Aggregate feedback from all reviewers and give final suggestions on the writing.";

/// Message asking a reviewer to look at `content`
pub fn review_message(content: &str) -> String {
    format!("Review the following content. \n\n {content}")
}

/// One reviewer's condensed feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Reviewer identity as reported in the summary
    pub reviewer: String,
    /// Review text
    pub review: String,
    /// Whether the summary parsed as a JSON object
    pub structured: bool,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Agent names in the order they were consulted, meta-reviewer last
    pub consulted: Vec<String>,
    /// Condensed reviews in reviewer order
    pub reviews: Vec<ReviewResult>,
    /// The meta-reviewer's final recommendation
    pub meta_review: String,
}

/// A reviewer and, optionally, its own condensing prompt
struct Reviewer {
    agent: Arc<dyn Agent>,
    summary_prompt: Option<String>,
}

/// Ordered reviewers followed by a meta-reviewer
pub struct ReviewPipeline {
    reviewers: Vec<Reviewer>,
    meta_reviewer: Arc<dyn Agent>,
    summary_prompt: String,
    meta_message: String,
}

impl ReviewPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> ReviewPipelineBuilder {
        ReviewPipelineBuilder::new()
    }

    /// Reviewer names in consultation order, meta-reviewer last
    pub fn order(&self) -> Vec<String> {
        self.reviewers
            .iter()
            .map(|r| &r.agent)
            .chain(std::iter::once(&self.meta_reviewer))
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Review `content` on behalf of `reviewing_agent`
    ///
    /// `reviewing_agent` opens every nested exchange and writes the condensed
    /// summary of each reviewer's answer.
    #[instrument(skip_all, fields(reviewer_count = self.reviewers.len()))]
    pub async fn review(
        &self,
        reviewing_agent: Arc<dyn Agent>,
        content: &str,
        context: &mut Context,
    ) -> Result<ReviewReport> {
        let message = review_message(content);
        let mut sequence = ChatSequence::new();
        for reviewer in &self.reviewers {
            let prompt = reviewer
                .summary_prompt
                .as_deref()
                .unwrap_or(&self.summary_prompt);
            sequence = sequence.add_task(
                ChatTask::new(
                    reviewer.agent.name(),
                    reviewing_agent.clone(),
                    reviewer.agent.clone(),
                    message.clone(),
                )
                .without_carryover()
                .max_turns(1)
                .summary(SummaryMethod::reflection(prompt)),
            );
        }
        sequence = sequence.add_task(
            ChatTask::new(
                self.meta_reviewer.name(),
                reviewing_agent,
                self.meta_reviewer.clone(),
                self.meta_message.clone(),
            )
            .max_turns(1),
        );

        let mut results = sequence.run(context).await?;
        let meta = results
            .pop()
            .ok_or_else(|| Error::ProcessingFailed("review produced no results".to_string()))?;

        let reviews: Vec<ReviewResult> = self
            .reviewers
            .iter()
            .zip(&results)
            .map(|(reviewer, result)| parse_review(&result.summary, reviewer.agent.name()))
            .collect();

        info!(
            structured = reviews.iter().filter(|r| r.structured).count(),
            "Review pipeline finished"
        );

        Ok(ReviewReport {
            consulted: self.order(),
            reviews,
            meta_review: meta.summary,
        })
    }
}

/// Builder for ReviewPipeline
pub struct ReviewPipelineBuilder {
    reviewers: Vec<Reviewer>,
    meta_reviewer: Option<Arc<dyn Agent>>,
    summary_prompt: String,
    meta_message: String,
}

impl ReviewPipelineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            reviewers: Vec::new(),
            meta_reviewer: None,
            summary_prompt: REVIEW_SUMMARY_PROMPT.to_string(),
            meta_message: META_REVIEW_MESSAGE.to_string(),
        }
    }

    /// Append a reviewer condensed with the shared summary prompt
    pub fn reviewer(mut self, agent: Arc<dyn Agent>) -> Self {
        self.reviewers.push(Reviewer {
            agent,
            summary_prompt: None,
        });
        self
    }

    /// Append a reviewer condensed with its own summary prompt
    pub fn reviewer_with_summary(mut self, agent: Arc<dyn Agent>, prompt: impl Into<String>) -> Self {
        self.reviewers.push(Reviewer {
            agent,
            summary_prompt: Some(prompt.into()),
        });
        self
    }

    /// Set the meta-reviewer
    pub fn meta_reviewer(mut self, agent: Arc<dyn Agent>) -> Self {
        self.meta_reviewer = Some(agent);
        self
    }

    /// Override the shared condensing prompt
    pub fn summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.summary_prompt = prompt.into();
        self
    }

    /// Override the meta-reviewer message
    pub fn meta_message(mut self, message: impl Into<String>) -> Self {
        self.meta_message = message.into();
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns an error when no reviewer or no meta-reviewer is set
    pub fn build(self) -> Result<ReviewPipeline> {
        if self.reviewers.is_empty() {
            return Err(Error::InitializationFailed(
                "review pipeline needs at least one reviewer".to_string(),
            ));
        }
        let meta_reviewer = self.meta_reviewer.ok_or_else(|| {
            Error::InitializationFailed("meta-reviewer not set".to_string())
        })?;

        Ok(ReviewPipeline {
            reviewers: self.reviewers,
            meta_reviewer,
            summary_prompt: self.summary_prompt,
            meta_message: self.meta_message,
        })
    }
}

impl Default for ReviewPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_llm::testing::ScriptedProvider;
    use finsight_runtime::{LlmAgent, LlmConfig};

    fn agent(provider: &Arc<ScriptedProvider>, name: &str) -> Arc<dyn Agent> {
        let config = LlmConfig {
            system_prompt: format!("You are {name}."),
            ..LlmConfig::default()
        };
        Arc::new(LlmAgent::new(provider.clone(), config, name))
    }

    /// Answers according to the system prompt of the agent being asked
    fn provider() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new(|req| {
            let system = req.system.clone().unwrap_or_default();
            let last = req.last_text().unwrap_or_default();
            Ok(if last.starts_with("Return review") {
                "{'reviewer': 'R', 'review': 'ok'}".to_string()
            } else if system.contains("Meta") {
                format!("final suggestions based on: {last}")
            } else {
                format!("{system} reviewed")
            })
        }))
    }

    #[test]
    fn test_builder_requires_agents() {
        let p = provider();
        assert!(ReviewPipeline::builder().build().is_err());
        assert!(
            ReviewPipeline::builder()
                .reviewer(agent(&p, "Legal_Reviewer"))
                .build()
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_reviewers_run_in_order_then_meta() {
        let p = provider();
        let pipeline = ReviewPipeline::builder()
            .reviewer(agent(&p, "Legal_Reviewer"))
            .reviewer(agent(&p, "Consistency_reviewer"))
            .meta_reviewer(agent(&p, "Meta_Reviewer"))
            .build()
            .unwrap();

        let critic = agent(&p, "Critic");
        let report = pipeline
            .review(critic, "# Draft report", &mut Context::new())
            .await
            .unwrap();

        assert_eq!(
            report.consulted,
            ["Legal_Reviewer", "Consistency_reviewer", "Meta_Reviewer"]
        );
        assert_eq!(report.reviews.len(), 2);
        assert!(report.reviews.iter().all(|r| r.structured));

        let requests = p.requests();
        // reviewer, reflection, reviewer, reflection, meta
        assert_eq!(requests.len(), 5);
        assert_eq!(
            requests[0].last_text(),
            Some("Review the following content. \n\n # Draft report")
        );
        assert_eq!(requests[0].system.as_deref(), Some("You are Legal_Reviewer."));
        assert_eq!(requests[1].system.as_deref(), Some("You are Critic."));
        assert_eq!(requests[2].system.as_deref(), Some("You are Consistency_reviewer."));

        let meta_prompt = requests[4].last_text().unwrap_or_default();
        assert!(meta_prompt.starts_with(META_REVIEW_MESSAGE));
        assert!(meta_prompt.contains("\nContext: \n{'reviewer': 'R', 'review': 'ok'}\n{'reviewer'"));
        assert!(report.meta_review.starts_with("final suggestions based on:"));
    }

    #[tokio::test]
    async fn test_reviewer_specific_summary_prompt() {
        let p = provider();
        let pipeline = ReviewPipeline::builder()
            .reviewer_with_summary(
                agent(&p, "Legal_Reviewer"),
                "Return review into a JSON object only: {'Reviewer': '', 'Review': ''}.",
            )
            .reviewer(agent(&p, "Completion_Reviewer"))
            .meta_reviewer(agent(&p, "Meta_Reviewer"))
            .build()
            .unwrap();

        let report = pipeline
            .review(agent(&p, "Critic"), "# Draft", &mut Context::new())
            .await
            .unwrap();
        assert_eq!(report.reviews.len(), 2);

        let requests = p.requests();
        assert_eq!(
            requests[1].last_text(),
            Some("Return review into a JSON object only: {'Reviewer': '', 'Review': ''}.")
        );
        assert_eq!(requests[3].last_text(), Some(REVIEW_SUMMARY_PROMPT));
    }
}

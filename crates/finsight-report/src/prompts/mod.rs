//! Report prompt templates
//!
//! Every instruction the pipeline sends is a named MiniJinja template:
//! - `report.system.*`: agent system prompts
//! - `report.task.*`: stage task messages
//! - `report.carryover.*`: context appended to stage tasks
//! - `report.summary.*`: reflection prompts

mod registry;
mod system;
mod task;
mod template;

pub use registry::PromptRegistry;
pub use template::PromptTemplate;

use crate::error::Result;

/// Template names
pub mod keys {
    pub const SYSTEM_ASSISTANT: &str = "report.system.assistant";
    pub const SYSTEM_WRITER: &str = "report.system.writer";
    pub const SYSTEM_CRITIC: &str = "report.system.critic";
    pub const SYSTEM_LEGAL_REVIEWER: &str = "report.system.legal_reviewer";
    pub const SYSTEM_TEXT_ALIGNMENT_REVIEWER: &str = "report.system.text_alignment_reviewer";
    pub const SYSTEM_CONSISTENCY_REVIEWER: &str = "report.system.consistency_reviewer";
    pub const SYSTEM_COMPLETION_REVIEWER: &str = "report.system.completion_reviewer";
    pub const SYSTEM_META_REVIEWER: &str = "report.system.meta_reviewer";

    pub const TASK_PRICING: &str = "report.task.pricing";
    pub const TASK_NEWS: &str = "report.task.news";
    pub const TASK_WRITING: &str = "report.task.writing";
    pub const TASK_RETRY: &str = "report.task.retry";
    pub const TASK_META_REVIEW: &str = "report.task.meta_review";

    pub const CARRYOVER_PRICING: &str = "report.carryover.pricing";
    pub const CARRYOVER_NEWS: &str = "report.carryover.news";
    pub const CARRYOVER_WRITING: &str = "report.carryover.writing";

    pub const SUMMARY_PRICING: &str = "report.summary.pricing";
    pub const SUMMARY_NEWS: &str = "report.summary.news";
    pub const SUMMARY_REVIEW: &str = "report.summary.review";
    pub const SUMMARY_LEGAL_REVIEW: &str = "report.summary.legal_review";
}

/// Register all report prompts with the given registry
///
/// # Example
///
/// ```
/// use finsight_report::prompts::{PromptRegistry, keys, register_prompts};
///
/// let registry = PromptRegistry::new();
/// register_prompts(&registry).unwrap();
/// assert!(registry.contains(keys::TASK_PRICING));
/// ```
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    // System prompts
    registry.register(system::assistant()?);
    registry.register(system::writer()?);
    registry.register(system::critic()?);
    registry.register(system::legal_reviewer()?);
    registry.register(system::text_alignment_reviewer()?);
    registry.register(system::consistency_reviewer()?);
    registry.register(system::completion_reviewer()?);
    registry.register(system::meta_reviewer()?);

    // Stage tasks
    registry.register(task::pricing()?);
    registry.register(task::news()?);
    registry.register(task::writing()?);
    registry.register(task::retry()?);
    registry.register(task::meta_review()?);

    // Carryovers
    registry.register(task::pricing_carryover()?);
    registry.register(task::news_carryover()?);
    registry.register(task::writing_carryover()?);

    // Reflection prompts
    registry.register(task::pricing_summary()?);
    registry.register(task::news_summary()?);
    registry.register(task::review_summary()?);
    registry.register(task::legal_review_summary()?);

    Ok(())
}

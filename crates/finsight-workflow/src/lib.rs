//! Multi-agent orchestration for finsight
//!
//! This crate composes runtime exchanges into larger structures:
//!
//! - [`ChatSequence`]: ordered chat tasks whose summaries carry over
//! - [`ReviewPipeline`]: reviewers consulted one by one, then aggregated
//! - [`ReviewedAgent`]: an agent that runs a review pipeline whenever a
//!   trigger agent speaks to it

pub mod parse;
pub mod review;
pub mod reviewed_agent;
pub mod sequence;

pub use parse::parse_review;
pub use review::{
    META_REVIEW_MESSAGE, REVIEW_SUMMARY_PROMPT, ReviewPipeline, ReviewPipelineBuilder, ReviewReport,
    ReviewResult, review_message,
};
pub use reviewed_agent::ReviewedAgent;
pub use sequence::{ChatSequence, ChatTask, with_carryover};

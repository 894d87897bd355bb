//! Multi-agent financial report generation
//!
//! This crate wires the finsight agents into the report pipeline:
//!
//! - **Pricing**: a code-writing assistant gathers prices, ratios and a
//!   normalized price chart, with validation and retry
//! - **News gathering**: a researcher collects headlines for each asset
//! - **Drafting**: a writer drafts the report; a critic answers each draft
//!   with the aggregated feedback of legal, text-alignment, consistency and
//!   completion reviewers
//! - **Export**: the report is saved as markdown and bundled with the chart
//!
//! # Example
//!
//! ```no_run
//! use finsight_report::{ReportConfig, ReportPipeline, Tickers};
//! use finsight_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> finsight_report::Result<()> {
//! let config = ReportConfig::builder()
//!     .with_env()?
//!     .work_dir("coding")
//!     .build()?;
//! let pipeline = ReportPipeline::new(config, Arc::new(OpenAIProvider::from_env()?))?;
//!
//! let outcome = pipeline.run(&Tickers::parse("NVDA, AMD")?).await?;
//! for stage in &outcome.stages {
//!     println!("{}: {} turns ({})", stage.stage, stage.turns, stage.termination);
//! }
//! outcome.export()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod prompts;
pub mod roles;
pub mod tickers;
pub mod validation;

pub use config::{ReportConfig, ReportConfigBuilder};
pub use error::{ReportError, Result};
pub use export::{ARCHIVE_FILE, REPORT_FILE, ReportArtifact, ReportExporter, archive_entries};
pub use pipeline::{PipelineOutcome, ReportPipeline, Stage, StageReport};
pub use roles::{AgentRegistry, Role, USER_PROXY_NAME};
pub use tickers::Tickers;
pub use validation::{CHART_FILE, PricingCheck, validate_pricing};

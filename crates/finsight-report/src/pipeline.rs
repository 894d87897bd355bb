//! Three-stage report orchestration
//!
//! A run is a strictly linear sequence of exchanges:
//!
//! 1. **Pricing**: the user proxy asks the financial assistant for prices,
//!    ratios and the normalized price chart. The summary is validated and the
//!    exchange retried when prices are missing or the chart was not saved.
//! 2. **News gathering**: the user proxy asks the researcher for headlines.
//! 3. **Drafting**: the critic asks the writer for the report. Each draft the
//!    critic answers goes through the nested review pipeline first.
//!
//! Summaries of earlier stages are carried over into later task messages.

use crate::config::ReportConfig;
use crate::error::Result;
use crate::export::{ReportArtifact, ReportExporter};
use crate::prompts::{PromptRegistry, keys};
use crate::roles::{AgentRegistry, Role, USER_PROXY_NAME};
use crate::tickers::Tickers;
use crate::validation::{CHART_FILE, validate_pricing};
use chrono::Local;
use finsight_core::{Agent, ChatMessage, Context};
use finsight_llm::LLMProvider;
use finsight_runtime::{AgentRuntime, ChatResult, SummaryMethod, TerminationReason, UserProxyConfig};
use finsight_workflow::{ChatTask, ReviewPipeline, ReviewReport, ReviewedAgent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pricing,
    NewsGathering,
    Drafting,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Pricing, Stage::NewsGathering, Stage::Drafting];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pricing => "pricing",
            Stage::NewsGathering => "news_gathering",
            Stage::Drafting => "drafting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one stage did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Exchanges started, more than one only for retried pricing
    pub attempts: usize,
    /// Turns taken by the last exchange
    pub turns: usize,
    pub termination: TerminationReason,
    /// Summary carried over to later stages
    pub summary: String,
    /// Validation problems left after the last attempt
    pub issues: Vec<String>,
}

impl StageReport {
    fn new(stage: Stage, attempts: usize, result: &ChatResult, issues: Vec<String>) -> Self {
        Self {
            stage,
            attempts,
            turns: result.turns,
            termination: result.termination.clone(),
            summary: result.summary.clone(),
            issues,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: String,
    /// Directory holding executed code and artifacts for this run
    pub work_dir: PathBuf,
    /// One record per stage, in execution order
    pub stages: Vec<StageReport>,
    /// Transcript of the drafting exchange
    pub transcript: Vec<ChatMessage>,
    /// Nested review reports, one per reviewed draft
    pub reviews: Vec<ReviewReport>,
}

impl PipelineOutcome {
    /// Final report text: the last message of the drafting exchange
    pub fn report(&self) -> Option<&str> {
        self.transcript
            .last()
            .filter(|m| !m.is_blank())
            .map(|m| m.content.as_str())
    }

    /// Record of a given stage
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Write the report and its bundle into the run's working directory
    pub fn export(&self) -> Result<ReportArtifact> {
        ReportExporter::new(&self.work_dir).export(&self.transcript)
    }
}

/// Multi-agent financial report pipeline
///
/// # Example
///
/// ```no_run
/// use finsight_report::{ReportConfig, ReportPipeline, Tickers};
/// use finsight_llm::providers::OpenAIProvider;
/// use std::sync::Arc;
///
/// # async fn example() -> finsight_report::Result<()> {
/// let provider = Arc::new(OpenAIProvider::from_env()?);
/// let pipeline = ReportPipeline::new(ReportConfig::from_env()?, provider)?;
///
/// let outcome = pipeline.run(&Tickers::parse("AAPL, MSFT")?).await?;
/// let artifact = outcome.export()?;
/// println!("{}", artifact.report);
/// # Ok(())
/// # }
/// ```
pub struct ReportPipeline {
    config: ReportConfig,
    provider: Arc<dyn LLMProvider>,
    prompts: PromptRegistry,
}

/// Agents taking part in one run
struct Participants {
    proxy: Arc<dyn Agent>,
    agents: AgentRegistry,
    critic: Arc<ReviewedAgent>,
}

impl ReportPipeline {
    /// Create a pipeline, validating the configuration
    pub fn new(config: ReportConfig, provider: Arc<dyn LLMProvider>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            prompts: PromptRegistry::with_defaults()?,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Run all three stages for `tickers`
    #[instrument(skip_all, fields(tickers = %tickers))]
    pub async fn run(&self, tickers: &Tickers) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4().simple().to_string();
        let work_dir = if self.config.isolate_runs {
            self.config.work_dir.join(&run_id)
        } else {
            self.config.work_dir.clone()
        };
        tokio::fs::create_dir_all(&work_dir).await?;
        clear_stale_chart(&work_dir).await?;

        let date = self
            .config
            .report_date
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();

        let mut context = Context::new().with_run_id(run_id.clone());

        info!(%run_id, work_dir = %work_dir.display(), "Starting report run");
        let participants = self.participants(&work_dir)?;

        let mut summaries = Vec::with_capacity(Stage::ALL.len());
        let mut stages = Vec::with_capacity(Stage::ALL.len());

        let pricing_task = self.prompts.render(
            keys::TASK_PRICING,
            &json!({ "date": date, "assets": tickers.to_string() }),
        )?;
        let pricing = self
            .pricing(&participants, pricing_task, &work_dir, &summaries, &mut context)
            .await?;
        summaries.push(pricing.summary.clone());
        stages.push(pricing);

        let news = self.news(&participants, &summaries, &mut context).await?;
        summaries.push(news.summary.clone());
        stages.push(news);

        let (drafting, transcript) = self.drafting(&participants, &summaries, &mut context).await?;
        stages.push(drafting);

        let reviews = participants.critic.reviews();
        info!(%run_id, reviews = reviews.len(), "Report run finished");

        Ok(PipelineOutcome {
            run_id,
            work_dir,
            stages,
            transcript,
            reviews,
        })
    }

    fn participants(&self, work_dir: &Path) -> Result<Participants> {
        let runtime = AgentRuntime::new(self.provider.clone(), self.config.runtime_config(work_dir));
        let agents = AgentRegistry::new(&runtime, &self.prompts)?;

        let proxy_config = UserProxyConfig {
            last_n_messages: self.config.last_n_messages,
            ..UserProxyConfig::default()
        };
        let proxy: Arc<dyn Agent> = Arc::new(runtime.create_user_proxy(USER_PROXY_NAME, proxy_config));

        let mut review = ReviewPipeline::builder();
        for role in Role::REVIEWERS {
            review = review.reviewer_with_summary(agents.get(role), self.prompts.text(role.summary_key())?);
        }
        let review = review
            .meta_reviewer(agents.get(Role::MetaReviewer))
            .meta_message(self.prompts.text(keys::TASK_META_REVIEW)?)
            .build()?;
        let critic = Arc::new(ReviewedAgent::new(
            agents.get(Role::Critic),
            review,
            Role::Writer.agent_name(),
        ));

        Ok(Participants {
            proxy,
            agents,
            critic,
        })
    }

    #[instrument(skip_all, fields(stage = %Stage::Pricing))]
    async fn pricing(
        &self,
        participants: &Participants,
        task: String,
        work_dir: &Path,
        previous: &[String],
        context: &mut Context,
    ) -> Result<StageReport> {
        context.set_stage(Stage::Pricing.as_str());
        let carryover = self.prompts.text(keys::CARRYOVER_PRICING)?;
        let summary_prompt = self.prompts.text(keys::SUMMARY_PRICING)?;

        let mut message = task.clone();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = ChatTask::new(
                Stage::Pricing.as_str(),
                participants.proxy.clone(),
                participants.agents.get(Role::FinancialAssistant),
                message,
            )
            .carryover(carryover.clone())
            .max_turns(self.config.data_max_turns)
            .summary(SummaryMethod::reflection(summary_prompt.clone()))
            .run(previous, context)
            .await?;

            let check = validate_pricing(&result.summary, work_dir);
            if check.is_valid() {
                info!(attempts, prices = check.prices.len(), "Pricing data validated");
                return Ok(StageReport::new(Stage::Pricing, attempts, &result, Vec::new()));
            }
            if attempts >= self.config.max_pricing_attempts {
                warn!(attempts, issues = ?check.issues, "Pricing data still invalid, continuing");
                return Ok(StageReport::new(Stage::Pricing, attempts, &result, check.issues));
            }

            warn!(attempts, issues = ?check.issues, "Pricing data invalid, retrying");
            message = self.prompts.render(
                keys::TASK_RETRY,
                &json!({ "task": task, "issues": check.issues }),
            )?;
        }
    }

    #[instrument(skip_all, fields(stage = %Stage::NewsGathering))]
    async fn news(
        &self,
        participants: &Participants,
        previous: &[String],
        context: &mut Context,
    ) -> Result<StageReport> {
        context.set_stage(Stage::NewsGathering.as_str());
        let result = ChatTask::new(
            Stage::NewsGathering.as_str(),
            participants.proxy.clone(),
            participants.agents.get(Role::Researcher),
            self.prompts.text(keys::TASK_NEWS)?,
        )
        .carryover(self.prompts.text(keys::CARRYOVER_NEWS)?)
        .max_turns(self.config.data_max_turns)
        .summary(SummaryMethod::reflection(self.prompts.text(keys::SUMMARY_NEWS)?))
        .run(previous, context)
        .await?;

        Ok(StageReport::new(Stage::NewsGathering, 1, &result, Vec::new()))
    }

    #[instrument(skip_all, fields(stage = %Stage::Drafting))]
    async fn drafting(
        &self,
        participants: &Participants,
        previous: &[String],
        context: &mut Context,
    ) -> Result<(StageReport, Vec<ChatMessage>)> {
        context.set_stage(Stage::Drafting.as_str());
        let result = ChatTask::new(
            Stage::Drafting.as_str(),
            participants.critic.clone(),
            participants.agents.get(Role::Writer),
            self.prompts.text(keys::TASK_WRITING)?,
        )
        .carryover(self.prompts.text(keys::CARRYOVER_WRITING)?)
        .max_turns(self.config.drafting_turns())
        .run(previous, context)
        .await?;

        let report = StageReport::new(Stage::Drafting, 1, &result, Vec::new());
        Ok((report, result.transcript))
    }
}

/// Remove a chart left behind by an earlier run in a shared work dir
async fn clear_stale_chart(work_dir: &Path) -> Result<()> {
    match tokio::fs::remove_file(work_dir.join(CHART_FILE)).await {
        Ok(()) => {
            info!(work_dir = %work_dir.display(), "Removed chart from a previous run");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

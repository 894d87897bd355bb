//! Configuration for report generation

use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use finsight_runtime::RuntimeConfig;
use finsight_utils::{env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one report pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Model identifier shared by every agent
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature, provider default when `None`
    pub temperature: Option<f32>,

    /// Directory holding executed code and report artifacts
    pub work_dir: PathBuf,

    /// Give each run its own `work_dir/<run-id>` subdirectory
    pub isolate_runs: bool,

    /// Turn limit for the pricing and news exchanges
    pub data_max_turns: usize,

    /// Review rounds before the writer's final revision
    pub review_rounds: usize,

    /// Attempts allowed for the pricing stage before continuing with issues
    pub max_pricing_attempts: usize,

    /// Per-block code execution timeout
    pub code_timeout: Duration,

    /// HTTP timeout for completion requests
    pub request_timeout: Duration,

    /// Python interpreter used for python code blocks
    pub python_command: String,

    /// Messages the user proxy scans for code
    pub last_n_messages: usize,

    /// Date rendered into the pricing task, today when `None`
    pub report_date: Option<NaiveDate>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: None,
            work_dir: PathBuf::from("coding"),
            isolate_runs: false,
            data_max_turns: 20,
            review_rounds: 1,
            max_pricing_attempts: 2,
            code_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(120),
            python_command: "python3".to_string(),
            last_n_messages: 3,
            report_date: None,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Load configuration from `FINSIGHT_*` environment variables on top of
    /// the defaults
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ReportError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(ReportError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(ReportError::ConfigError(format!(
                "temperature must be between 0 and 2, got {t}"
            )));
        }

        if self.data_max_turns == 0 {
            return Err(ReportError::ConfigError(
                "data_max_turns must be greater than 0".to_string(),
            ));
        }

        if self.max_pricing_attempts == 0 {
            return Err(ReportError::ConfigError(
                "max_pricing_attempts must be greater than 0".to_string(),
            ));
        }

        if self.last_n_messages == 0 {
            return Err(ReportError::ConfigError(
                "last_n_messages must be greater than 0".to_string(),
            ));
        }

        if self.code_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ReportError::ConfigError(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        if self.python_command.trim().is_empty() {
            return Err(ReportError::ConfigError(
                "python_command must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Turn limit of the drafting exchange
    ///
    /// Each review round costs one turn; the writer's first draft takes the other.
    pub fn drafting_turns(&self) -> usize {
        self.review_rounds + 1
    }

    /// Runtime settings for agents working in `work_dir`
    pub fn runtime_config(&self, work_dir: &Path) -> RuntimeConfig {
        RuntimeConfig {
            default_model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            work_dir: work_dir.to_path_buf(),
            code_timeout: self.code_timeout,
            python_command: self.python_command.clone(),
        }
    }
}

/// Builder for ReportConfig
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    work_dir: Option<PathBuf>,
    isolate_runs: Option<bool>,
    data_max_turns: Option<usize>,
    review_rounds: Option<usize>,
    max_pricing_attempts: Option<usize>,
    code_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    python_command: Option<String>,
    last_n_messages: Option<usize>,
    report_date: Option<NaiveDate>,
}

impl ReportConfigBuilder {
    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the working directory
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Run each report in its own subdirectory
    pub fn isolate_runs(mut self, isolate: bool) -> Self {
        self.isolate_runs = Some(isolate);
        self
    }

    /// Set the turn limit for data-gathering exchanges
    pub fn data_max_turns(mut self, turns: usize) -> Self {
        self.data_max_turns = Some(turns);
        self
    }

    /// Set the number of review rounds
    pub fn review_rounds(mut self, rounds: usize) -> Self {
        self.review_rounds = Some(rounds);
        self
    }

    /// Set the pricing attempt limit
    pub fn max_pricing_attempts(mut self, attempts: usize) -> Self {
        self.max_pricing_attempts = Some(attempts);
        self
    }

    /// Set the code execution timeout
    pub fn code_timeout(mut self, timeout: Duration) -> Self {
        self.code_timeout = Some(timeout);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the python interpreter
    pub fn python_command(mut self, command: impl Into<String>) -> Self {
        self.python_command = Some(command.into());
        self
    }

    /// Set how many messages the user proxy scans for code
    pub fn last_n_messages(mut self, n: usize) -> Self {
        self.last_n_messages = Some(n);
        self
    }

    /// Pin the report date
    pub fn report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    /// Apply `FINSIGHT_*` environment variables
    ///
    /// Unset or blank variables leave the current value alone. Setters called
    /// afterwards take precedence.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(model) = env_var("FINSIGHT_MODEL") {
            self.model = Some(model);
        }
        if let Some(dir) = env_var("FINSIGHT_WORK_DIR") {
            self.work_dir = Some(PathBuf::from(dir));
        }
        if let Some(python) = env_var("FINSIGHT_PYTHON") {
            self.python_command = Some(python);
        }

        self.max_tokens = env_parse("FINSIGHT_MAX_TOKENS")?.or(self.max_tokens);
        self.temperature = env_parse("FINSIGHT_TEMPERATURE")?.or(self.temperature);
        self.isolate_runs = env_parse("FINSIGHT_ISOLATE_RUNS")?.or(self.isolate_runs);
        self.data_max_turns = env_parse("FINSIGHT_MAX_TURNS")?.or(self.data_max_turns);
        self.review_rounds = env_parse("FINSIGHT_REVIEW_ROUNDS")?.or(self.review_rounds);
        self.max_pricing_attempts =
            env_parse("FINSIGHT_PRICING_ATTEMPTS")?.or(self.max_pricing_attempts);
        self.last_n_messages = env_parse("FINSIGHT_LAST_N_MESSAGES")?.or(self.last_n_messages);
        self.report_date = env_parse("FINSIGHT_REPORT_DATE")?.or(self.report_date);

        if let Some(secs) = env_parse::<u64>("FINSIGHT_CODE_TIMEOUT_SECS")? {
            self.code_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env_parse::<u64>("FINSIGHT_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ReportConfig> {
        let defaults = ReportConfig::default();

        let config = ReportConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            work_dir: self.work_dir.unwrap_or(defaults.work_dir),
            isolate_runs: self.isolate_runs.unwrap_or(defaults.isolate_runs),
            data_max_turns: self.data_max_turns.unwrap_or(defaults.data_max_turns),
            review_rounds: self.review_rounds.unwrap_or(defaults.review_rounds),
            max_pricing_attempts: self
                .max_pricing_attempts
                .unwrap_or(defaults.max_pricing_attempts),
            code_timeout: self.code_timeout.unwrap_or(defaults.code_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            python_command: self.python_command.unwrap_or(defaults.python_command),
            last_n_messages: self.last_n_messages.unwrap_or(defaults.last_n_messages),
            report_date: self.report_date.or(defaults.report_date),
        };

        config.validate()?;
        Ok(config)
    }
}

//! Runtime for creating agents with shared dependencies
//!
//! The AgentRuntime owns the LLM provider and the model defaults, and hands
//! out agents that share them.

use finsight_core::Result;
use finsight_llm::LLMProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::agents::{LlmAgent, LlmConfig, UserProxyAgent, UserProxyConfig};
use crate::code::LocalCodeExecutor;

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model used by every LLM agent
    pub default_model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature, provider default when `None`
    pub temperature: Option<f32>,

    /// Directory agent-authored code runs in
    pub work_dir: PathBuf,

    /// Per-block code execution timeout
    pub code_timeout: Duration,

    /// Python interpreter command
    pub python_command: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: None,
            work_dir: PathBuf::from("coding"),
            code_timeout: Duration::from_secs(120),
            python_command: "python3".to_string(),
        }
    }
}

/// Factory for agents sharing one provider and one configuration
///
/// # Example
///
/// ```no_run
/// use finsight_runtime::AgentRuntime;
/// # use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn finsight_llm::LLMProvider>) -> finsight_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .default_model("gpt-4o-mini")
///     .work_dir("coding")
///     .build()?;
///
/// let writer = runtime.create_llm_agent("writer", "You are a professional writer.");
/// let proxy = runtime.create_user_proxy("User_Proxy_Auto", Default::default());
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create an LLM agent with the runtime's model settings
    pub fn create_llm_agent(
        &self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> LlmAgent {
        let config = LlmConfig {
            model: self.config.default_model.clone(),
            system_prompt: system_prompt.into(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        LlmAgent::new(self.provider.clone(), config, name)
    }

    /// Create a user proxy that executes code in the runtime's working directory
    pub fn create_user_proxy(
        &self,
        name: impl Into<String>,
        config: UserProxyConfig,
    ) -> UserProxyAgent {
        let executor = LocalCodeExecutor::new(&self.config.work_dir)
            .with_timeout(self.config.code_timeout)
            .with_python(self.config.python_command.clone());
        UserProxyAgent::new(name, Arc::new(executor), config)
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set the working directory for code execution
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            finsight_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime::new(provider, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

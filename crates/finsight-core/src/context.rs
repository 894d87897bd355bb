//! Execution context for agents
//!
//! The `Context` struct is a small key-value store that travels with a run.
//! The pipeline records which run and stage is active, and agents attach both
//! to their tracing spans.

use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Unique identifier of the report run
    pub const RUN_ID: &str = "run_id";
    /// Name of the pipeline stage currently executing
    pub const STAGE: &str = "stage";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use finsight_core::Context;
///
/// let ctx = Context::new()
///     .with_run_id("run-1")
///     .with_stage("pricing");
///
/// assert_eq!(ctx.run_id(), Some("run-1"));
/// assert_eq!(ctx.stage(), Some("pricing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run identifier
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, serde_json::json!(run_id.into()));
        self
    }

    /// Set the active stage
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.set_stage(stage);
        self
    }

    /// Get the run identifier
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(|v| v.as_str())
    }

    /// Get the active stage
    pub fn stage(&self) -> Option<&str> {
        self.get(keys::STAGE).and_then(|v| v.as_str())
    }

    /// Replace the active stage
    pub fn set_stage(&mut self, stage: impl Into<String>) {
        self.insert(keys::STAGE, serde_json::json!(stage.into()));
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

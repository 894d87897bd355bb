//! Error types for finsight-core

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// The completion service rejected or failed a request for an agent
    #[error("Completion failed for {agent}: {detail}")]
    CompletionFailed { agent: String, detail: String },

    /// Agent-authored code could not be run at all
    #[error("Code execution failed: {0}")]
    ExecutionFailed(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

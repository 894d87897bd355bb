//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

/// Report pipeline errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// No ticker was supplied
    #[error("Please enter at least one asset ticker before starting analysis.")]
    NoTickers,

    /// A ticker contains characters no exchange symbol uses
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// The final exchange produced nothing to export
    #[error("No content generated. Try again or check agent configuration.")]
    EmptyTranscript,

    /// A file the report depends on was never written
    #[error("Missing artifact: {}", path.display())]
    MissingArtifact {
        /// Expected location
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A prompt template failed to render
    #[error("Prompt {name} failed: {detail}")]
    PromptError {
        /// Template name
        name: String,
        /// Renderer message
        detail: String,
    },

    /// Agent or exchange failure
    #[error(transparent)]
    Agent(#[from] finsight_core::Error),

    /// Provider construction or completion failure
    #[error(transparent)]
    Llm(#[from] finsight_llm::LLMError),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive writing error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<finsight_utils::ConfigError> for ReportError {
    fn from(err: finsight_utils::ConfigError) -> Self {
        ReportError::ConfigError(err.to_string())
    }
}

impl From<ReportError> for finsight_core::Error {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Agent(inner) => inner,
            other => finsight_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

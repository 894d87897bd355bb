//! Typed termination conditions
//!
//! Every agent declares the condition under which a message it receives ends
//! the current exchange. Exchanges report which condition fired through their
//! own typed outcome instead of leaving callers to re-scan message bodies.

use serde::{Deserialize, Serialize};

/// Sentinel token agents emit when their task is complete
pub const TERMINATE: &str = "TERMINATE";

/// When a received message ends an exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sentinel", rename_all = "snake_case")]
pub enum TerminationCondition {
    /// Never terminate on content; only the turn limit applies
    Never,
    /// The trimmed message equals the sentinel
    Exact(String),
    /// The right-trimmed message ends with the sentinel
    EndsWith(String),
    /// The sentinel appears anywhere in the message
    Contains(String),
}

impl Default for TerminationCondition {
    fn default() -> Self {
        Self::Exact(TERMINATE.to_string())
    }
}

impl TerminationCondition {
    /// Terminate when the message ends with [`TERMINATE`]
    pub fn ends_with_terminate() -> Self {
        Self::EndsWith(TERMINATE.to_string())
    }

    /// Terminate when the message mentions [`TERMINATE`] anywhere
    pub fn contains_terminate() -> Self {
        Self::Contains(TERMINATE.to_string())
    }

    /// Check a message body against the condition
    pub fn matches(&self, content: &str) -> bool {
        match self {
            Self::Never => false,
            Self::Exact(sentinel) => content.trim() == sentinel,
            Self::EndsWith(sentinel) => {
                !content.is_empty() && content.trim_end().ends_with(sentinel.as_str())
            }
            Self::Contains(sentinel) => content.contains(sentinel.as_str()),
        }
    }

    /// The sentinel token, if any
    pub fn sentinel(&self) -> Option<&str> {
        match self {
            Self::Never => None,
            Self::Exact(s) | Self::EndsWith(s) | Self::Contains(s) => Some(s),
        }
    }
}

//! Transcript entries exchanged between agents

use serde::{Deserialize, Serialize};

/// One message in a two-party exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the agent that sent the message
    pub sender: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a message sent by `sender`
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Whether the message was sent by the named agent
    pub fn is_from(&self, name: &str) -> bool {
        self.sender == name
    }

    /// Whether the message carries no visible text
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

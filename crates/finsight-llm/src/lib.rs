//! LLM provider abstraction layer for finsight
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! chat-completion service. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider (feature `openai`, on by default)
//! - A scripted provider for deterministic tests (feature `testing`)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

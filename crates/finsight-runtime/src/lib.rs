//! Agent runtime for finsight
//!
//! This crate provides the building blocks that report stages are made of:
//! LLM-backed agents, the code-executing user proxy, the bounded two-party
//! [`Exchange`] and the [`AgentRuntime`] factory that wires them to a shared
//! provider.

pub mod agents;
pub mod code;
pub mod exchange;
pub mod runtime;

// Re-export key types
pub use agents::{LlmAgent, LlmConfig, UserProxyAgent, UserProxyConfig};
pub use code::{CodeBlock, CodeExecutor, ExecutionResult, LocalCodeExecutor, extract_code_blocks};
pub use exchange::{ChatResult, Exchange, SummaryMethod, TerminationReason};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};

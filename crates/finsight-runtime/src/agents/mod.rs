//! Concrete agent implementations

pub mod llm;
pub mod user_proxy;

pub use llm::{LlmAgent, LlmConfig};
pub use user_proxy::{UserProxyAgent, UserProxyConfig};

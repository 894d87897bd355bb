//! Extraction and local execution of agent-authored code blocks

pub mod executor;
pub mod extract;

pub use executor::{CodeExecutor, ExecutionResult, LocalCodeExecutor};
pub use extract::{CodeBlock, extract_code_blocks};

#[cfg(test)]
pub use executor::MockCodeExecutor;

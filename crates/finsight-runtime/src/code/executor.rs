//! Local execution of extracted code blocks
//!
//! Blocks run one after another inside a working directory. Python blocks go
//! through the configured interpreter and shell blocks through `sh`. The
//! first failing block stops the batch.

use super::CodeBlock;
use async_trait::async_trait;
use finsight_core::{Error, Result};
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Exit code reported when a block exceeds its time budget
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Outcome of running a batch of code blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the last block that ran
    pub exit_code: i32,
    /// Combined stdout/stderr of every block that ran
    pub output: String,
}

impl ExecutionResult {
    /// Whether every block exited with status 0
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Message the proxy sends back to the code author
    pub fn to_reply(&self) -> String {
        let status = if self.succeeded() {
            "execution succeeded"
        } else {
            "execution failed"
        };
        format!(
            "exitcode: {} ({status})\nCode output: {}",
            self.exit_code, self.output
        )
    }
}

/// Runs code blocks on behalf of an agent
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run `blocks` in order, stopping at the first failure
    async fn execute(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult>;
}

/// Executes code with local interpreters inside a working directory
#[derive(Debug, Clone)]
pub struct LocalCodeExecutor {
    work_dir: PathBuf,
    timeout: Duration,
    python: String,
}

impl LocalCodeExecutor {
    /// Create an executor rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout: Duration::from_secs(120),
            python: "python3".to_string(),
        }
    }

    /// Set the per-block timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the python interpreter command
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Working directory blocks run in
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn interpreter(&self, language: &str) -> Option<(&str, &'static str)> {
        match language {
            "python" | "py" | "python3" => Some((self.python.as_str(), "py")),
            "sh" | "bash" | "shell" | "console" => Some(("sh", "sh")),
            _ => None,
        }
    }

    async fn run_block(&self, block: &CodeBlock) -> Result<ExecutionResult> {
        let Some((program, ext)) = self.interpreter(&block.language) else {
            return Ok(ExecutionResult {
                exit_code: 1,
                output: format!("unknown language {}", block.language),
            });
        };

        let file_name = match block.filename() {
            Some(name) if !is_inside_work_dir(name) => {
                return Ok(ExecutionResult {
                    exit_code: 1,
                    output: format!("Error: filename {name} is not inside the working directory"),
                });
            }
            Some(name) => name.to_string(),
            None => format!("tmp_code_{}.{ext}", uuid::Uuid::new_v4().simple()),
        };

        let path = self.work_dir.join(&file_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &block.code).await?;
        debug!(file = %file_name, language = %block.language, "Running code block");

        let child = Command::new(program)
            .arg(&file_name)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(program, error = %e, "Failed to start interpreter");
                return Ok(ExecutionResult {
                    exit_code: 1,
                    output: format!("Failed to start {program}: {e}"),
                });
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(ExecutionResult {
                    exit_code: output.status.code().unwrap_or(1),
                    output: text,
                })
            }
            Err(_) => {
                warn!(file = %file_name, timeout = ?self.timeout, "Code block timed out");
                Ok(ExecutionResult {
                    exit_code: TIMEOUT_EXIT_CODE,
                    output: "Timeout".to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl CodeExecutor for LocalCodeExecutor {
    async fn execute(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult> {
        tokio::fs::create_dir_all(&self.work_dir).await.map_err(|e| {
            Error::ExecutionFailed(format!(
                "cannot create working directory {}: {e}",
                self.work_dir.display()
            ))
        })?;

        let mut output = String::new();
        let mut exit_code = 0;
        for block in blocks {
            let result = self.run_block(block).await?;
            output.push_str(&result.output);
            exit_code = result.exit_code;
            if !result.succeeded() {
                break;
            }
        }

        info!(blocks = blocks.len(), exit_code, "Code execution finished");
        Ok(ExecutionResult { exit_code, output })
    }
}

fn is_inside_work_dir(name: &str) -> bool {
    let path = Path::new(name);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(dir: &Path) -> LocalCodeExecutor {
        LocalCodeExecutor::new(dir).with_timeout(Duration::from_secs(10))
    }

    #[test]
    fn test_reply_format() {
        let ok = ExecutionResult {
            exit_code: 0,
            output: "42\n".to_string(),
        };
        assert_eq!(ok.to_reply(), "exitcode: 0 (execution succeeded)\nCode output: 42\n");

        let failed = ExecutionResult {
            exit_code: 2,
            output: String::new(),
        };
        assert_eq!(failed.to_reply(), "exitcode: 2 (execution failed)\nCode output: ");
    }

    #[test]
    fn test_work_dir_containment() {
        assert!(is_inside_work_dir("plot.py"));
        assert!(is_inside_work_dir("scripts/plot.py"));
        assert!(!is_inside_work_dir("../escape.py"));
        assert!(!is_inside_work_dir("/etc/passwd"));
    }

    #[tokio::test]
    async fn test_shell_block_runs_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = [CodeBlock::new("sh", "echo hello > out.txt\ncat out.txt")];

        let result = executor(dir.path()).execute(&blocks).await.unwrap();
        assert!(result.succeeded());
        assert_eq!(result.output.trim(), "hello");
        assert!(dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = [
            CodeBlock::new("sh", "echo first"),
            CodeBlock::new("sh", "exit 3"),
            CodeBlock::new("sh", "echo never"),
        ];

        let result = executor(dir.path()).execute(&blocks).await.unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(result.output.contains("first"));
        assert!(!result.output.contains("never"));
    }

    #[tokio::test]
    async fn test_unknown_language() {
        let dir = tempfile::tempdir().unwrap();
        let result = executor(dir.path())
            .execute(&[CodeBlock::new("ruby", "puts 1")])
            .await
            .unwrap();
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.output, "unknown language ruby");
    }

    #[tokio::test]
    async fn test_filename_header_saves_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = [CodeBlock::new("sh", "# filename: fetch.sh\necho saved")];

        let result = executor(dir.path()).execute(&blocks).await.unwrap();
        assert!(result.succeeded());
        assert!(dir.path().join("fetch.sh").exists());
    }

    #[tokio::test]
    async fn test_filename_outside_work_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let blocks = [CodeBlock::new("sh", "# filename: ../evil.sh\necho no")];

        let result = executor(dir.path()).execute(&blocks).await.unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("not inside the working directory"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalCodeExecutor::new(dir.path())
            .with_timeout(Duration::from_millis(200))
            .execute(&[CodeBlock::new("sh", "sleep 5")])
            .await
            .unwrap();
        assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
        assert_eq!(result.output, "Timeout");
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let result = executor(dir.path())
            .with_python("definitely-not-a-python-binary")
            .execute(&[CodeBlock::new("python", "print(1)")])
            .await
            .unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(result.output.starts_with("Failed to start"));
    }
}

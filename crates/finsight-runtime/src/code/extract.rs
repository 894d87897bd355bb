//! Fenced code block extraction

use regex::Regex;
use std::sync::LazyLock;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?s)```[ \t]*([\w+-]*)[ \t]*\r?\n(.*?)\r?\n?```").unwrap()
});

static FILENAME_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\s*#\s*filename:\s*(\S+)").unwrap()
});

/// A fenced block of code found in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Lower-cased language tag, inferred when the fence has none
    pub language: String,
    /// Block body without the fences
    pub code: String,
}

impl CodeBlock {
    /// Create a code block
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            code: code.into(),
        }
    }

    /// File name requested by a `# filename: <name>` first line
    pub fn filename(&self) -> Option<&str> {
        let first = self.code.lines().next()?;
        FILENAME_HEADER
            .captures(first)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Extract every fenced code block from `text`, in order
///
/// Blocks without a language tag are treated as shell when they start with a
/// shell-looking command and as python otherwise.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    CODE_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let code = caps.get(2)?.as_str();
            if code.trim().is_empty() {
                return None;
            }
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let language = if tag.is_empty() {
                infer_language(code)
            } else {
                tag
            };
            Some(CodeBlock::new(language, code))
        })
        .collect()
}

fn infer_language(code: &str) -> &'static str {
    const SHELL_PREFIXES: [&str; 8] = ["pip ", "pip3 ", "python ", "python3 ", "sh ", "bash ", "ls", "echo "];
    let first = code.trim_start();
    if SHELL_PREFIXES.iter().any(|p| first.starts_with(p)) {
        "sh"
    } else {
        "python"
    }
}

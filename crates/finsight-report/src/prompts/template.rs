//! MiniJinja-backed prompt template

use crate::error::{ReportError, Result};
use minijinja::Environment;

/// A named prompt template using Jinja2 syntax
///
/// The source is compiled once at construction so that syntax errors surface
/// at registration rather than mid-run.
///
/// ```
/// use finsight_report::prompts::PromptTemplate;
/// use serde_json::json;
///
/// let template = PromptTemplate::new("greeting", "Hello, {{ name }}!").unwrap();
/// assert_eq!(template.render(&json!({ "name": "AAPL" })).unwrap(), "Hello, AAPL!");
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    /// Create a template, validating its syntax
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();

        Environment::new()
            .template_from_str(&source)
            .map_err(|e| ReportError::PromptError {
                name: name.clone(),
                detail: e.to_string(),
            })?;

        Ok(Self { name, source })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with the given variables
    pub fn render(&self, vars: &serde_json::Value) -> Result<String> {
        Environment::new()
            .render_str(&self.source, vars)
            .map_err(|e| ReportError::PromptError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }
}

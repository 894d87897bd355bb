//! Thread-safe prompt registry

use super::PromptTemplate;
use crate::error::{ReportError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Named prompt templates shared by every agent of a pipeline
#[derive(Debug, Default)]
pub struct PromptRegistry {
    templates: RwLock<HashMap<String, Arc<PromptTemplate>>>,
}

impl PromptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every report prompt
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::new();
        super::register_prompts(&registry)?;
        Ok(registry)
    }

    /// Register a template, replacing any template with the same name
    pub fn register(&self, template: PromptTemplate) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(template.name().to_string(), Arc::new(template));
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<Arc<PromptTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Check whether a template is registered
    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered template names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Render a registered template
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        let template = self.get(name).ok_or_else(|| ReportError::PromptError {
            name: name.to_string(),
            detail: "template not registered".to_string(),
        })?;
        template.render(vars)
    }

    /// Render a template that takes no variables
    pub fn text(&self, name: &str) -> Result<String> {
        self.render(name, &serde_json::json!({}))
    }
}

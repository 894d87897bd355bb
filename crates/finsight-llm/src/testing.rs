//! Deterministic provider for tests
//!
//! [`ScriptedProvider`] answers requests from a closure or a fixed queue and
//! records every request it receives, so tests can assert on what agents
//! actually asked for.

use crate::{CompletionRequest, CompletionResponse, LLMError, LLMProvider, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

type Handler = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

/// An [`LLMProvider`] driven by a script instead of a remote service
pub struct ScriptedProvider {
    handler: Handler,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Answer each request with the closure's output
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests with `replies` in order, failing once they run out
    pub fn from_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(replies.into_iter().map(Into::into).collect());
        Self::new(move |_| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| LLMError::ProviderError("scripted replies exhausted".to_string()))
        })
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let text = (self.handler)(&request)?;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        Ok(CompletionResponse::text(text))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

//! Scripted backend for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use super::{GenerationBackend, ModelInfo};
use crate::constants::selector::SMOKE_TEST_PROMPT;
use crate::types::{ErrorCategory, LlmError, Result, ToneError};

/// Scripted reply for a non-smoke-test `generate` call
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail(ErrorCategory, String),
}

pub(crate) struct MockBackend {
    discovery: Option<Vec<ModelInfo>>,
    working: HashSet<String>,
    smoke_replies: HashMap<String, String>,
    fallbacks: Vec<String>,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    /// Backend with no models, no working candidates and no fallbacks
    pub(crate) fn new() -> Self {
        Self {
            discovery: Some(Vec::new()),
            working: HashSet::new(),
            smoke_replies: HashMap::new(),
            fallbacks: Vec::new(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose single fallback model answers smoke tests
    pub(crate) fn healthy(model: &str) -> Self {
        Self::new().with_fallbacks(&[model]).with_working(&[model])
    }

    pub(crate) fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.discovery = Some(models);
        self
    }

    pub(crate) fn failing_discovery(mut self) -> Self {
        self.discovery = None;
        self
    }

    pub(crate) fn with_working(mut self, models: &[&str]) -> Self {
        self.working.extend(models.iter().map(|m| m.to_string()));
        self
    }

    /// Answer the smoke test for `model` with `reply` instead of "OK"
    pub(crate) fn with_smoke_reply(mut self, model: &str, reply: &str) -> Self {
        self.smoke_replies
            .insert(model.to_string(), reply.to_string());
        self
    }

    pub(crate) fn with_fallbacks(mut self, models: &[&str]) -> Self {
        self.fallbacks = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub(crate) fn with_reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Every (model, prompt) pair passed to `generate`, in call order
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Models that received a smoke test, in order
    pub(crate) fn probed_models(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(_, prompt)| prompt == SMOKE_TEST_PROMPT)
            .map(|(model, _)| model)
            .collect()
    }

    /// Number of analysis (non-smoke-test) calls
    pub(crate) fn analysis_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(_, prompt)| prompt != SMOKE_TEST_PROMPT)
            .count()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.discovery.clone().ok_or_else(|| {
            ToneError::Llm(LlmError::with_provider(
                ErrorCategory::Auth,
                "401 Unauthorized",
                "mock",
            ))
        })
    }

    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), prompt.to_string()));

        if prompt == SMOKE_TEST_PROMPT {
            if let Some(reply) = self.smoke_replies.get(model_id) {
                return Ok(reply.clone());
            }
            return if self.working.contains(model_id) {
                Ok("OK".to_string())
            } else {
                Err(ToneError::Llm(LlmError::with_provider(
                    ErrorCategory::Unavailable,
                    format!("404 model {} not found", model_id),
                    "mock",
                )))
            };
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(category, message)) => Err(ToneError::Llm(
                LlmError::with_provider(category, message, "mock"),
            )),
            None => Ok("OK".to_string()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn fallback_models(&self) -> Vec<String> {
        self.fallbacks.clone()
    }
}

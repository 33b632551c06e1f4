//! Generation Backend Abstraction
//!
//! Defines the `GenerationBackend` trait the analysis engine talks to.
//! A backend can list the models it serves and generate plain text with one
//! of them; the engine never depends on which concrete service sits behind it.
//!
//! ## Backends
//!
//! - `gemini`: Google Generative Language REST API
//! - `ollama`: Locally running Ollama server

mod gemini;
mod ollama;

#[cfg(test)]
pub(crate) mod mock;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::constants::selector::GENERATE_OPERATION;
use crate::types::{Result, ToneError};

/// Model advertised by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Identifier passed back to `generate`
    pub id: String,
    /// Operations the model supports, normalized to the engine's names
    pub supported_operations: Vec<String>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, supported_operations: Vec<String>) -> Self {
        Self {
            id: id.into(),
            supported_operations,
        }
    }

    /// Model that supports content generation
    pub fn generative(id: impl Into<String>) -> Self {
        Self::new(id, vec![GENERATE_OPERATION.to_string()])
    }

    /// Whether the model advertises content generation
    pub fn supports_generation(&self) -> bool {
        self.supported_operations
            .iter()
            .any(|op| op == GENERATE_OPERATION)
    }
}

/// Shared backend handle for concurrent request tasks.
pub type SharedBackend = Arc<dyn GenerationBackend + Send + Sync>;

// =============================================================================
// Generation Backend Trait
// =============================================================================

/// Text generation service boundary
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// List models the backend serves (may fail)
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Generate text with the given model.
    ///
    /// Quota/overload conditions must surface as errors classified as
    /// `ErrorCategory::RateLimit`.
    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Known-good model identifiers tried after the discovered ones
    fn fallback_models(&self) -> Vec<String>;
}

/// Create a shared backend from configuration
pub fn create_backend(config: &BackendConfig) -> Result<SharedBackend> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiBackend::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaBackend::new(config.clone())?)),
        _ => Err(ToneError::Config(format!(
            "Unknown provider: {}. Supported: gemini, ollama",
            config.provider
        ))),
    }
}

/// Validate endpoint URL (http/https only, trailing slash removed)
pub(crate) fn validate_endpoint(endpoint: &str, provider: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        ToneError::Config(format!(
            "Invalid {} endpoint URL '{}': {}",
            provider, endpoint, e
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToneError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            provider,
            url.scheme()
        )));
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

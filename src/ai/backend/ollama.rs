//! Ollama Local Backend
//!
//! Generation backend for locally-running Ollama models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{GenerationBackend, ModelInfo, validate_endpoint};
use crate::config::BackendConfig;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, ToneError};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";
const PROVIDER: &str = "ollama";

/// Ollama Local Backend
pub struct OllamaBackend {
    api_base: String,
    temperature: f32,
    fallback_models: Vec<String>,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let api_base = validate_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER,
        )?;

        if let Ok(url) = url::Url::parse(&api_base)
            && let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let fallback_models = config
            .fallback_models
            .unwrap_or_else(|| vec![DEFAULT_MODEL.to_string()]);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToneError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            temperature: config.temperature,
            fallback_models,
            client,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ToneError {
        if e.is_connect() {
            ToneError::Llm(LlmError::with_provider(
                ErrorCategory::Network,
                format!(
                    "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                    self.api_base
                ),
                PROVIDER,
            ))
        } else {
            ToneError::Backend(format!("Ollama request failed: {}", e))
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ToneError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ToneError::Llm(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("Ollama API error ({}): {}", status, body),
            PROVIDER,
        ))
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.api_base);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| ToneError::Backend(format!("Failed to parse Ollama tags: {}", e)))?;

        info!("Ollama lists {} local models", tags.models.len());

        // Every pulled Ollama model can generate
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo::generative(m.name))
            .collect())
    }

    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.api_base);
        let request = OllamaRequest {
            model: model_id.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!(model = model_id, "Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ToneError::Backend(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(body.response)
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn fallback_models(&self) -> Vec<String> {
        self.fallback_models.clone()
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

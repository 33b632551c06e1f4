//! Gemini Backend
//!
//! Generation backend for Google's Generative Language REST API.
//! The API key is sent in the `x-goog-api-key` header, never in the URL.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{GenerationBackend, ModelInfo, validate_endpoint};
use crate::config::BackendConfig;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, ToneError};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const PROVIDER: &str = "gemini";

/// Known-good model identifiers tried after discovery
const KNOWN_MODELS: &[&str] = &[
    "gemini-1.5-flash-001",
    "gemini-1.5-pro-001",
    "gemini-1.0-pro",
    "gemini-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Gemini backend with secure API key handling
pub struct GeminiBackend {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    temperature: f32,
    fallback_models: Vec<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("temperature", &self.temperature)
            .field("fallback_models", &self.fallback_models)
            .finish()
    }
}

impl GeminiBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
            })
            .ok_or_else(|| {
                ToneError::Config(format!(
                    "Gemini API key not found. Set {} env var or provide backend.api_key in config",
                    API_KEY_ENV
                ))
            })?;

        let api_base = validate_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER,
        )?;

        let fallback_models = config
            .fallback_models
            .unwrap_or_else(|| KNOWN_MODELS.iter().map(|m| m.to_string()).collect());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToneError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            temperature: config.temperature,
            fallback_models,
            client,
        })
    }

    /// Resource path for a model id (`gemini-pro` and `models/gemini-pro` both work)
    fn model_path(model_id: &str) -> String {
        if model_id.starts_with("models/") {
            model_id.to_string()
        } else {
            format!("models/{}", model_id)
        }
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ToneError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        ToneError::Llm(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("Gemini API error ({}): {}", status, body),
            PROVIDER,
        ))
    }

    fn transport_error(e: reqwest::Error) -> ToneError {
        let category = if e.is_connect() || e.is_timeout() {
            ErrorCategory::Network
        } else {
            ErrorCategory::Unknown
        };
        ToneError::Llm(LlmError::with_provider(
            category,
            format!("Gemini request failed: {}", e),
            PROVIDER,
        ))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.api_base);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", self.api_key.expose_secret());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(Self::transport_error)?;
            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }

            let page: ListModelsResponse = response.json().await.map_err(|e| {
                ToneError::Backend(format!("Failed to parse Gemini model list: {}", e))
            })?;

            // Gemini's method names already match the engine's operation names
            models.extend(
                page.models
                    .into_iter()
                    .map(|m| ModelInfo::new(m.name, m.supported_generation_methods)),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Gemini lists {} models", models.len());
        Ok(models)
    }

    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent",
            self.api_base,
            Self::model_path(model_id)
        );
        debug!(model = model_id, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ToneError::Backend(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(body.text())
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
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiModel {
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> BackendConfig {
        BackendConfig {
            provider: PROVIDER.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let backend = GeminiBackend::new(config_with_key()).expect("Failed to create backend");
        assert_eq!(backend.api_base, DEFAULT_API_BASE);
        assert_eq!(backend.fallback_models().len(), KNOWN_MODELS.len());
        assert_eq!(backend.fallback_models()[0], "gemini-1.5-flash-001");
    }

    #[test]
    fn test_configured_fallback_models_replace_builtin() {
        let config = BackendConfig {
            fallback_models: Some(vec!["gemini-2.0-flash".to_string()]),
            ..config_with_key()
        };
        let backend = GeminiBackend::new(config).unwrap();
        assert_eq!(backend.fallback_models(), vec!["gemini-2.0-flash"]);
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = GeminiBackend::new(config_with_key()).unwrap();
        let debug = format!("{:?}", backend);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn test_model_path() {
        assert_eq!(GeminiBackend::model_path("gemini-pro"), "models/gemini-pro");
        assert_eq!(
            GeminiBackend::model_path("models/gemini-pro"),
            "models/gemini-pro"
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "DETECTED_TONE: casual\n"}, {"text": "CONFIDENCE: 0.9"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(body.text(), "DETECTED_TONE: casual\nCONFIDENCE: 0.9");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let body: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}))
                .unwrap();
        assert!(body.text().is_empty());
    }

    #[test]
    fn test_list_models_payload() {
        let page: ListModelsResponse = serde_json::from_value(serde_json::json!({
            "models": [
                {"name": "models/gemini-pro", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
            ]
        }))
        .unwrap();
        assert_eq!(page.models.len(), 2);
        assert!(page.next_page_token.is_none());
        assert_eq!(page.models[1].supported_generation_methods, vec!["embedContent"]);
    }
}

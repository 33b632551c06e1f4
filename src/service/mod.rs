//! Tone Service
//!
//! Consumer-facing layer over [`ToneEngine`]: validates requests, shapes
//! responses, persists history and reports health.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ai::{StatsSnapshot, ToneEngine};
use crate::config::Config;
use crate::constants::{input::MAX_TEXT_CHARS, service};
use crate::storage::{Database, SharedDatabase};
use crate::types::{
    AnalysisRequest, AnalysisResponse, Result, ToneCategory, ToneError,
};

/// Tone vocabulary listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportedTones {
    pub supported_tones: Vec<String>,
    pub description: String,
}

/// Service health snapshot
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: String,
    /// Configured provider, if a backend could be built
    pub backend: Option<String>,
    pub backend_available: bool,
    pub active_model: Option<String>,
    pub rate_limit_delay_secs: f64,
    pub stats: StatsSnapshot,
}

pub struct ToneService {
    engine: Arc<ToneEngine>,
    database: Option<SharedDatabase>,
}

impl ToneService {
    pub fn new(engine: Arc<ToneEngine>, database: Option<SharedDatabase>) -> Self {
        Self { engine, database }
    }

    /// Build the engine, select a model and open history storage if enabled.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut engine = ToneEngine::from_config(config);
        engine.initialize().await;

        let database = if config.storage.enabled {
            let db = Database::open(&config.storage.database_path)?;
            db.initialize()?;
            debug!(path = %config.storage.database_path.display(), "History storage ready");
            Some(Arc::new(db))
        } else {
            None
        };

        Ok(Self::new(Arc::new(engine), database))
    }

    pub fn engine(&self) -> &ToneEngine {
        &self.engine
    }

    pub fn database(&self) -> Option<&SharedDatabase> {
        self.database.as_ref()
    }

    /// Check the input contract: non-blank text of at most 1000 characters.
    pub fn validate(request: &AnalysisRequest) -> Result<()> {
        if request.text.trim().is_empty() {
            return Err(ToneError::empty("Text cannot be empty"));
        }
        if request.text.chars().count() > MAX_TEXT_CHARS {
            return Err(ToneError::too_long(format!(
                "Text too long. Maximum {} characters.",
                MAX_TEXT_CHARS
            )));
        }
        Ok(())
    }

    /// Analyze a request. Only input-contract violations and storage failures
    /// are errors; backend problems produce a fallback response.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse> {
        Self::validate(&request)?;

        let outcome = self
            .engine
            .analyze(&request.text, request.context.as_deref())
            .await;

        let degraded = outcome.is_degraded();
        let mut result = outcome.result;
        if !result.confidence.is_finite() {
            result.confidence = 0.0;
        }

        let mut response = AnalysisResponse {
            result,
            context: request.context.clone(),
            service: degraded.then(|| service::FALLBACK_SERVICE.to_string()),
            note: degraded.then(|| service::FALLBACK_NOTE.to_string()),
            conversation_id: None,
        };

        if degraded {
            info!("Using fallback tone analysis");
        } else {
            info!("Successfully generated tone analysis");
        }

        if let Some(db) = &self.database {
            let db = Arc::clone(db);
            let stored = response.clone();
            let id = tokio::task::spawn_blocking(move || db.save_analysis(&request, &stored))
                .await
                .map_err(|e| ToneError::Storage(format!("History write task failed: {}", e)))??;
            response.conversation_id = Some(id);
        }

        Ok(response)
    }

    pub fn supported_tones() -> SupportedTones {
        SupportedTones {
            supported_tones: ToneCategory::vocabulary()
                .into_iter()
                .map(String::from)
                .collect(),
            description: service::SUPPORTED_TONES_DESCRIPTION.to_string(),
        }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            backend: self.engine.backend_name().map(String::from),
            backend_available: self.engine.is_ready(),
            active_model: self.engine.active_model().map(String::from),
            rate_limit_delay_secs: self.engine.rate_limiter().min_call_interval().as_secs_f64(),
            stats: self.engine.stats().snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RateLimiter;
    use crate::ai::backend::mock::{MockBackend, Reply};
    use crate::types::ValidationErrorKind;
    use std::time::Duration;

    const REPLY: &str = "DETECTED_TONE: casual\nCONFIDENCE: 0.85\nTONE_CATEGORY: casual\n\
                         EXPLANATION: Informal abbreviations.\nENHANCED_VERSIONS:\n\
                         1. Professional: Could you please send the report?\nSUGGESTIONS:\n\
                         - Avoid abbreviations like \"u\"";

    async fn service(backend: Option<MockBackend>, with_db: bool) -> ToneService {
        let mut engine = ToneEngine::new(
            backend.map(|b| Arc::new(b) as crate::ai::SharedBackend),
            RateLimiter::new(Duration::ZERO, Duration::from_secs(2)),
        );
        engine.initialize().await;

        let database = with_db.then(|| {
            let db = Database::open_in_memory().unwrap();
            db.initialize().unwrap();
            Arc::new(db)
        });

        ToneService::new(Arc::new(engine), database)
    }

    #[tokio::test]
    async fn test_rejects_blank_text() {
        let service = service(None, false).await;
        let err = service
            .analyze(AnalysisRequest::new("   \n"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Text cannot be empty");
        assert!(matches!(
            err,
            ToneError::Validation(ref v) if v.kind == ValidationErrorKind::Empty
        ));
    }

    #[tokio::test]
    async fn test_length_limit() {
        let service = service(None, false).await;

        assert!(service.analyze(AnalysisRequest::new("é".repeat(1000))).await.is_ok());

        let err = service
            .analyze(AnalysisRequest::new("a".repeat(1001)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Text too long. Maximum 1000 characters.");
    }

    #[tokio::test]
    async fn test_degraded_response_is_marked() {
        let service = service(None, false).await;
        let response = service
            .analyze(AnalysisRequest::new("Hello team").with_context("email"))
            .await
            .unwrap();

        assert_eq!(response.service.as_deref(), Some("smart-fallback"));
        assert!(response.note.is_some());
        assert_eq!(response.context.as_deref(), Some("email"));
        assert_eq!(response.result.confidence, 0.7);
        assert!(response.conversation_id.is_none());
    }

    #[tokio::test]
    async fn test_backend_response_persisted() {
        let backend = MockBackend::healthy("gemini-pro").with_reply(Reply::Text(REPLY.into()));
        let service = service(Some(backend), true).await;

        let response = service
            .analyze(AnalysisRequest::new("hey can u send the report"))
            .await
            .unwrap();

        assert!(!response.is_fallback());
        assert_eq!(response.result.detected_tone, "casual");

        let id = response.conversation_id.expect("persisted");
        let detail = service
            .database()
            .unwrap()
            .get_conversation(&id)
            .unwrap()
            .unwrap();
        assert_eq!(detail.summary.detected_tone.as_deref(), Some("casual"));
        assert_eq!(detail.analysis.result, response.result);
    }

    #[test]
    fn test_supported_tones() {
        let tones = ToneService::supported_tones();
        assert_eq!(tones.supported_tones.len(), 10);
        assert_eq!(tones.supported_tones[0], "formal");
        assert_eq!(
            tones.description,
            "Available tone categories for analysis and enhancement"
        );
    }

    #[tokio::test]
    async fn test_health_reports_engine_state() {
        let ready = service(Some(MockBackend::healthy("m")), false).await;
        let health = ready.health();

        assert_eq!(health.status, "healthy");
        assert!(health.backend_available);
        assert_eq!(health.backend.as_deref(), Some("mock"));
        assert_eq!(health.active_model.as_deref(), Some("m"));

        let degraded = service(None, false).await.health();
        assert_eq!(degraded.status, "healthy");
        assert!(!degraded.backend_available);
        assert!(degraded.active_model.is_none());
    }

    #[tokio::test]
    async fn test_overload_reflected_in_health() {
        let backend = MockBackend::healthy("m")
            .with_reply(Reply::Fail(crate::types::ErrorCategory::RateLimit, "quota".into()));
        let service = service(Some(backend), false).await;

        service.analyze(AnalysisRequest::new("hi")).await.unwrap();

        assert_eq!(service.health().rate_limit_delay_secs, 2.0);
        assert_eq!(service.health().stats.overload_signals, 1);
    }
}

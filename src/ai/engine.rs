//! Tone Analysis Engine
//!
//! Owns the backend handle, the selected model, the rate limiter and request
//! statistics, and turns `(text, context)` into an [`AnalysisOutcome`].
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize()--> Ready     (a candidate answered its smoke test)
//!                             \-> Degraded  (no backend, or every candidate failed)
//! ```
//!
//! Both outcomes are terminal. `initialize` takes `&mut self`; afterwards the
//! engine is shared behind an `Arc` and only read.
//!
//! ## Per-request failures
//!
//! In `Ready`, an invocation error or a blank reply yields a fallback result
//! for that request only. Any other reply goes through the tolerant parser. Overload errors also widen
//! the rate limiter interval. `analyze` never fails.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::backend::{SharedBackend, create_backend};
use super::fallback::fallback_analysis;
use super::parser::parse;
use super::prompt::build_prompt;
use super::rate_limiter::RateLimiter;
use super::selector::{Selection, select_model};
use super::stats::EngineStats;
use crate::config::Config;
use crate::types::{AnalysisOutcome, ErrorClassifier, FallbackReason};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
    Degraded,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Ready => "ready",
            EngineState::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

pub struct ToneEngine {
    backend: Option<SharedBackend>,
    state: EngineState,
    selection: Selection,
    limiter: RateLimiter,
    stats: EngineStats,
}

impl ToneEngine {
    /// Engine over an explicit backend. `None` means no backend could be built.
    pub fn new(backend: Option<SharedBackend>, limiter: RateLimiter) -> Self {
        Self {
            backend,
            state: EngineState::Uninitialized,
            selection: Selection::default(),
            limiter,
            stats: EngineStats::new(),
        }
    }

    /// Engine from configuration. A backend construction error (e.g. a missing
    /// API key) is logged and leaves the engine without a backend.
    pub fn from_config(config: &Config) -> Self {
        let backend = match create_backend(&config.backend) {
            Ok(backend) => Some(backend),
            Err(e) => {
                warn!(
                    provider = %config.backend.provider,
                    error = %e,
                    "Generation backend unavailable, fallback analysis only"
                );
                None
            }
        };
        Self::new(backend, RateLimiter::from_config(&config.rate_limit))
    }

    /// Select a working model. Runs once; later calls return the cached result.
    pub async fn initialize(&mut self) -> bool {
        if self.state != EngineState::Uninitialized {
            return self.state == EngineState::Ready;
        }

        let Some(backend) = self.backend.clone() else {
            warn!("No generation backend configured, engine degraded");
            self.state = EngineState::Degraded;
            return false;
        };

        self.selection = select_model(backend.as_ref()).await;
        self.state = if self.selection.is_ready() {
            info!(
                backend = backend.name(),
                model = self.active_model().unwrap_or_default(),
                "Tone engine ready"
            );
            EngineState::Ready
        } else {
            warn!(backend = backend.name(), "Tone engine degraded");
            EngineState::Degraded
        };

        self.state == EngineState::Ready
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn active_model(&self) -> Option<&str> {
        self.selection.active_model_id.as_deref()
    }

    pub fn candidate_models(&self) -> &[String] {
        &self.selection.candidate_model_ids
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Analyze `text`. Always returns a result; the source records whether it
    /// came from the backend or the fallback generator.
    #[instrument(
        skip(self, text, context),
        fields(request_id = %Uuid::new_v4(), chars = text.chars().count())
    )]
    pub async fn analyze(&self, text: &str, context: Option<&str>) -> AnalysisOutcome {
        self.stats.record_request();
        let outcome = self.run(text, context).await;
        self.stats.record_source(&outcome.source);
        outcome
    }

    async fn run(&self, text: &str, context: Option<&str>) -> AnalysisOutcome {
        let (Some(backend), Some(model), EngineState::Ready) =
            (&self.backend, self.active_model(), self.state)
        else {
            debug!(state = %self.state, "Engine not ready, using fallback analysis");
            return AnalysisOutcome::fallback(
                fallback_analysis(text),
                FallbackReason::EngineDegraded,
            );
        };

        self.limiter.wait_for_next_call().await;

        let prompt = build_prompt(text, context);
        let started = Instant::now();

        let reply = match backend.generate(model, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                let classified = ErrorClassifier::classify_error(&e, backend.name());
                let reason = if classified.is_overload() {
                    self.limiter.on_overload_signal();
                    FallbackReason::Overloaded
                } else {
                    FallbackReason::InvocationFailed
                };
                warn!(
                    model,
                    category = %classified.category,
                    error = %e,
                    "Backend call failed, using fallback analysis"
                );
                return AnalysisOutcome::fallback(fallback_analysis(text), reason);
            }
        };

        if reply.trim().is_empty() {
            warn!(model, "Backend returned a blank reply, using fallback analysis");
            return AnalysisOutcome::fallback(fallback_analysis(text), FallbackReason::EmptyReply);
        }

        let result = parse(&reply, text);
        self.stats
            .record_latency(started.elapsed().as_millis() as u64);
        debug!(model, tone = %result.detected_tone, "Backend analysis parsed");
        AnalysisOutcome::backend(result, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backend::mock::{MockBackend, Reply};
    use crate::ai::fallback::fallback_suggestions;
    use crate::types::{AnalysisSource, ErrorCategory};
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;

    const TEXT: &str = "hey can u send the report";

    const REPLY: &str = "DETECTED_TONE: casual\nCONFIDENCE: 0.85\nTONE_CATEGORY: casual\n\
                         EXPLANATION: Informal abbreviations.\nENHANCED_VERSIONS:\n\
                         1. Professional: Could you please send the report?\nSUGGESTIONS:\n\
                         - Avoid abbreviations like \"u\"";

    fn fast_limiter() -> RateLimiter {
        RateLimiter::new(Duration::ZERO, Duration::from_millis(10))
    }

    async fn ready_engine(backend: MockBackend) -> (ToneEngine, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let mut engine = ToneEngine::new(Some(backend.clone()), fast_limiter());
        assert!(engine.initialize().await);
        (engine, backend)
    }

    #[tokio::test]
    async fn test_backend_result() {
        let (engine, backend) =
            ready_engine(MockBackend::healthy("gemini-pro").with_reply(Reply::Text(REPLY.into())))
                .await;

        let outcome = engine.analyze(TEXT, Some("email")).await;

        assert_eq!(
            outcome.source,
            AnalysisSource::Backend {
                model: "gemini-pro".to_string()
            }
        );
        assert_eq!(outcome.result.detected_tone, "casual");
        assert_eq!(outcome.result.confidence, 0.85);
        assert_eq!(outcome.result.enhanced_versions.len(), 1);

        let (_, prompt) = backend.calls().pop().unwrap();
        assert!(prompt.contains("Context: email"));
        assert!(prompt.contains(TEXT));
    }

    #[tokio::test]
    async fn test_degraded_without_backend() {
        let mut engine = ToneEngine::new(None, fast_limiter());
        assert!(!engine.initialize().await);
        assert_eq!(engine.state(), EngineState::Degraded);

        let outcome = engine.analyze(TEXT, None).await;
        assert_eq!(outcome.result, fallback_analysis(TEXT));
        assert_eq!(
            outcome.source,
            AnalysisSource::Fallback {
                reason: FallbackReason::EngineDegraded
            }
        );
    }

    #[tokio::test]
    async fn test_degraded_makes_no_backend_calls() {
        let backend = Arc::new(MockBackend::new().with_fallbacks(&["broken"]));
        let mut engine = ToneEngine::new(Some(backend.clone()), fast_limiter());

        assert!(!engine.initialize().await);
        engine.analyze(TEXT, None).await;

        assert_eq!(backend.analysis_calls(), 0);
    }

    #[tokio::test]
    async fn test_uninitialized_uses_fallback() {
        let engine = ToneEngine::new(
            Some(Arc::new(MockBackend::healthy("m"))),
            fast_limiter(),
        );
        let outcome = engine.analyze(TEXT, None).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_initialize_is_terminal() {
        let backend = Arc::new(MockBackend::healthy("m"));
        let mut engine = ToneEngine::new(Some(backend.clone()), fast_limiter());

        assert!(engine.initialize().await);
        assert!(engine.initialize().await);
        assert_eq!(backend.probed_models(), vec!["m"]);
    }

    #[tokio::test]
    async fn test_overload_widens_interval_and_stays_ready() {
        let (engine, _) = ready_engine(MockBackend::healthy("m").with_reply(Reply::Fail(
            ErrorCategory::RateLimit,
            "429 quota exceeded".into(),
        )))
        .await;
        let before = engine.rate_limiter().min_call_interval();

        let outcome = engine.analyze(TEXT, None).await;

        assert_eq!(
            outcome.source,
            AnalysisSource::Fallback {
                reason: FallbackReason::Overloaded
            }
        );
        assert!(engine.rate_limiter().min_call_interval() > before);
        assert!(engine.is_ready());

        let next = engine.analyze(TEXT, None).await;
        assert!(!next.is_degraded());
    }

    #[tokio::test]
    async fn test_invocation_failure_keeps_interval() {
        let (engine, _) = ready_engine(
            MockBackend::healthy("m")
                .with_reply(Reply::Fail(ErrorCategory::Network, "connection reset".into())),
        )
        .await;

        let outcome = engine.analyze(TEXT, None).await;

        assert_eq!(
            outcome.source,
            AnalysisSource::Fallback {
                reason: FallbackReason::InvocationFailed
            }
        );
        assert_eq!(engine.rate_limiter().overload_signals(), 0);
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let (engine, _) =
            ready_engine(MockBackend::healthy("m").with_reply(Reply::Text("  \n ".into()))).await;

        let outcome = engine.analyze(TEXT, None).await;

        assert_eq!(outcome.result, fallback_analysis(TEXT));
        assert_eq!(
            outcome.source,
            AnalysisSource::Fallback {
                reason: FallbackReason::EmptyReply
            }
        );
    }

    #[tokio::test]
    async fn test_unstructured_reply_uses_parser_defaults() {
        let (engine, _) = ready_engine(
            MockBackend::healthy("m").with_reply(Reply::Text("I think it's fine.".into())),
        )
        .await;

        let outcome = engine.analyze(TEXT, None).await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.result.confidence, 0.8);
        assert_eq!(outcome.result.suggestions, fallback_suggestions("neutral"));
    }

    #[tokio::test]
    async fn test_stats_track_sources() {
        let (engine, _) = ready_engine(
            MockBackend::healthy("m")
                .with_reply(Reply::Text(REPLY.into()))
                .with_reply(Reply::Text(String::new())),
        )
        .await;

        engine.analyze(TEXT, None).await;
        engine.analyze(TEXT, None).await;

        let stats = engine.stats().snapshot();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.backend_results, 1);
        assert_eq!(stats.fallback_results, 1);
        assert_eq!(stats.empty_replies, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_spaced() {
        let backend = Arc::new(MockBackend::healthy("m"));
        let mut engine = ToneEngine::new(
            Some(backend.clone()),
            RateLimiter::new(Duration::from_secs(2), Duration::from_secs(2)),
        );
        engine.initialize().await;
        let engine = Arc::new(engine);

        let start = tokio::time::Instant::now();
        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.analyze(TEXT, None).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(backend.analysis_calls(), 3);
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    proptest! {
        #[test]
        fn test_analyze_is_total(
            text in ".{0,120}",
            reply in "(?s).{0,300}",
            fail in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let result = runtime.block_on(async {
                let mock = if fail {
                    MockBackend::healthy("m")
                        .with_reply(Reply::Fail(ErrorCategory::Transient, "500".into()))
                } else {
                    MockBackend::healthy("m").with_reply(Reply::Text(reply))
                };
                let mut engine = ToneEngine::new(Some(Arc::new(mock)), fast_limiter());
                engine.initialize().await;
                engine.analyze(&text, None).await.result
            });

            prop_assert_eq!(result.original_text, text);
            prop_assert!(!result.enhanced_versions.is_empty());
            prop_assert!(!result.suggestions.is_empty());
            prop_assert!(result.confidence.is_finite());
        }
    }
}

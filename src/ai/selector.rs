//! Backend Model Selection
//!
//! Picks the first model that actually answers.
//!
//! ## Strategy
//!
//! 1. Ask the backend for its models (failure is tolerated)
//! 2. Keep models that advertise content generation
//! 3. Append the backend's known-good identifiers (no dedup)
//! 4. Smoke-test candidates in order; the first non-blank reply wins
//!
//! Candidate failures are logged and absorbed. Each candidate gets exactly one
//! smoke test.

use tracing::{debug, info, warn};

use super::backend::GenerationBackend;
use crate::constants::selector::SMOKE_TEST_PROMPT;

/// Result of a selection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Every model id that was eligible for a smoke test, in try order
    pub candidate_model_ids: Vec<String>,
    /// Model that passed its smoke test
    pub active_model_id: Option<String>,
}

impl Selection {
    pub fn is_ready(&self) -> bool {
        self.active_model_id.is_some()
    }
}

/// Build the ordered try-list: discovered generative models, then fallbacks
pub async fn candidate_models(backend: &dyn GenerationBackend) -> Vec<String> {
    let mut candidates = match backend.list_models().await {
        Ok(models) => {
            let supported: Vec<String> = models
                .into_iter()
                .filter(|m| m.supports_generation())
                .map(|m| m.id)
                .collect();
            info!(
                backend = backend.name(),
                count = supported.len(),
                "Discovered generative models"
            );
            supported
        }
        Err(e) => {
            warn!(
                backend = backend.name(),
                error = %e,
                "Model discovery failed, using known-good list"
            );
            Vec::new()
        }
    };

    candidates.extend(backend.fallback_models());
    candidates
}

/// Smoke-test candidates in order and adopt the first that answers
pub async fn select_model(backend: &dyn GenerationBackend) -> Selection {
    let candidate_model_ids = candidate_models(backend).await;

    for model_id in &candidate_model_ids {
        debug!(model = %model_id, "Smoke-testing candidate");

        match backend.generate(model_id, SMOKE_TEST_PROMPT).await {
            Ok(reply) if !reply.is_empty() => {
                info!(backend = backend.name(), model = %model_id, "Adopted model");
                return Selection {
                    active_model_id: Some(model_id.clone()),
                    candidate_model_ids,
                };
            }
            Ok(_) => {
                warn!(model = %model_id, "Candidate returned an empty smoke-test reply");
            }
            Err(e) => {
                warn!(model = %model_id, error = %e, "Candidate failed smoke test");
            }
        }
    }

    warn!(
        backend = backend.name(),
        tried = candidate_model_ids.len(),
        "No candidate model answered"
    );
    Selection {
        candidate_model_ids,
        active_model_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backend::ModelInfo;
    use crate::ai::backend::mock::MockBackend;

    #[tokio::test]
    async fn test_third_candidate_adopted() {
        let backend = MockBackend::new()
            .with_models(vec![
                ModelInfo::generative("models/a"),
                ModelInfo::generative("models/b"),
            ])
            .with_fallbacks(&["c", "d"])
            .with_working(&["c", "d"]);

        let selection = select_model(&backend).await;

        assert_eq!(selection.active_model_id.as_deref(), Some("c"));
        assert_eq!(backend.probed_models(), vec!["models/a", "models/b", "c"]);
    }

    #[tokio::test]
    async fn test_non_generative_models_skipped() {
        let backend = MockBackend::new()
            .with_models(vec![
                ModelInfo::new("models/embed", vec!["embedContent".to_string()]),
                ModelInfo::generative("models/gen"),
            ])
            .with_working(&["models/gen"]);

        let selection = select_model(&backend).await;

        assert_eq!(selection.candidate_model_ids, vec!["models/gen"]);
        assert_eq!(selection.active_model_id.as_deref(), Some("models/gen"));
    }

    #[tokio::test]
    async fn test_discovery_failure_uses_fallbacks() {
        let backend = MockBackend::new()
            .failing_discovery()
            .with_fallbacks(&["gemini-pro"])
            .with_working(&["gemini-pro"]);

        let selection = select_model(&backend).await;

        assert!(selection.is_ready());
        assert_eq!(selection.candidate_model_ids, vec!["gemini-pro"]);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let backend = MockBackend::new()
            .with_models(vec![ModelInfo::generative("models/a")])
            .with_fallbacks(&["b"]);

        let selection = select_model(&backend).await;

        assert!(!selection.is_ready());
        assert_eq!(backend.probed_models(), vec!["models/a", "b"]);
    }

    #[tokio::test]
    async fn test_any_non_empty_reply_adopts() {
        let backend = MockBackend::new()
            .with_fallbacks(&["silent", "spaces"])
            .with_smoke_reply("silent", "")
            .with_smoke_reply("spaces", " ");

        let selection = select_model(&backend).await;

        assert_eq!(selection.active_model_id.as_deref(), Some("spaces"));
        assert_eq!(backend.probed_models(), vec!["silent", "spaces"]);
    }

    #[tokio::test]
    async fn test_duplicates_are_not_removed() {
        let backend = MockBackend::new()
            .with_models(vec![ModelInfo::generative("gemini-pro")])
            .with_fallbacks(&["gemini-pro"]);

        let selection = select_model(&backend).await;

        assert_eq!(selection.candidate_model_ids, vec!["gemini-pro", "gemini-pro"]);
        assert_eq!(backend.probed_models().len(), 2);
    }
}

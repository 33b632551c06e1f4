//! Tone analysis data model.

use serde::{Deserialize, Serialize};

/// Fixed tone vocabulary exposed by the supported-tones listing.
///
/// Parsed backend output is not constrained to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneCategory {
    Formal,
    Casual,
    Professional,
    Friendly,
    Persuasive,
    Inspirational,
    Empathetic,
    Authoritative,
    Enthusiastic,
    Neutral,
}

impl ToneCategory {
    /// All categories in their canonical order
    pub const ALL: [ToneCategory; 10] = [
        ToneCategory::Formal,
        ToneCategory::Casual,
        ToneCategory::Professional,
        ToneCategory::Friendly,
        ToneCategory::Persuasive,
        ToneCategory::Inspirational,
        ToneCategory::Empathetic,
        ToneCategory::Authoritative,
        ToneCategory::Enthusiastic,
        ToneCategory::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToneCategory::Formal => "formal",
            ToneCategory::Casual => "casual",
            ToneCategory::Professional => "professional",
            ToneCategory::Friendly => "friendly",
            ToneCategory::Persuasive => "persuasive",
            ToneCategory::Inspirational => "inspirational",
            ToneCategory::Empathetic => "empathetic",
            ToneCategory::Authoritative => "authoritative",
            ToneCategory::Enthusiastic => "enthusiastic",
            ToneCategory::Neutral => "neutral",
        }
    }

    /// Vocabulary as plain strings, in canonical order
    pub fn vocabulary() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl std::fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToneCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown tone category: {}", s))
    }
}

/// Inbound analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    /// Free-form label, e.g. "email" or "business"
    #[serde(default)]
    pub context: Option<String>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// One tone-shifted rewrite of the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedVersion {
    pub tone: String,
    pub text: String,
}

impl EnhancedVersion {
    pub fn new(tone: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tone: tone.into(),
            text: text.into(),
        }
    }
}

/// Structured tone analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub original_text: String,
    pub detected_tone: String,
    pub confidence: f64,
    pub tone_category: String,
    pub enhanced_versions: Vec<EnhancedVersion>,
    pub suggestions: Vec<String>,
    pub explanation: String,
}

/// Why a result came from the fallback generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Engine never found a working backend
    EngineDegraded,
    /// Backend call failed
    InvocationFailed,
    /// Backend call failed with an overload/quota signal
    Overloaded,
    /// Backend answered with blank text
    EmptyReply,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FallbackReason::EngineDegraded => "engine degraded",
            FallbackReason::InvocationFailed => "invocation failed",
            FallbackReason::Overloaded => "backend overloaded",
            FallbackReason::EmptyReply => "empty reply",
        };
        f.write_str(s)
    }
}

/// Where an analysis came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    Backend { model: String },
    Fallback { reason: FallbackReason },
}

/// Engine output: the result plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
}

impl AnalysisOutcome {
    pub fn backend(result: AnalysisResult, model: impl Into<String>) -> Self {
        Self {
            result,
            source: AnalysisSource::Backend {
                model: model.into(),
            },
        }
    }

    pub fn fallback(result: AnalysisResult, reason: FallbackReason) -> Self {
        Self {
            result,
            source: AnalysisSource::Fallback { reason },
        }
    }

    /// Whether the result was produced without a usable backend reply
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, AnalysisSource::Fallback { .. })
    }
}

/// Consumer-facing analysis: the flattened result plus request echo and markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub context: Option<String>,
    /// `smart-fallback` when the backend did not produce the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// History id, set once the analysis is persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl AnalysisResponse {
    pub fn is_fallback(&self) -> bool {
        self.service.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_order() {
        let vocab = ToneCategory::vocabulary();
        assert_eq!(vocab.len(), 10);
        assert_eq!(vocab[0], "formal");
        assert_eq!(vocab[9], "neutral");
    }

    #[test]
    fn test_tone_category_from_str() {
        assert_eq!(
            " Casual ".parse::<ToneCategory>().unwrap(),
            ToneCategory::Casual
        );
        assert!("sarcastic".parse::<ToneCategory>().is_err());
    }

    #[test]
    fn test_enhanced_version_serializes_as_tone_and_text() {
        let version = EnhancedVersion::new("Formal", "Good day.");
        let json = serde_json::to_value(&version).unwrap();
        assert_eq!(json["tone"], "Formal");
        assert_eq!(json["text"], "Good day.");
    }

    #[test]
    fn test_outcome_degraded_flag() {
        let result = AnalysisResult {
            original_text: "hi".to_string(),
            detected_tone: "neutral".to_string(),
            confidence: 0.7,
            tone_category: "neutral".to_string(),
            enhanced_versions: vec![],
            suggestions: vec![],
            explanation: String::new(),
        };
        assert!(
            AnalysisOutcome::fallback(result.clone(), FallbackReason::EmptyReply).is_degraded()
        );
        assert!(!AnalysisOutcome::backend(result, "gemini-pro").is_degraded());
    }

    #[test]
    fn test_response_flattens_result() {
        let response = AnalysisResponse {
            result: AnalysisResult {
                original_text: "hi".to_string(),
                detected_tone: "casual".to_string(),
                confidence: 0.9,
                tone_category: "casual".to_string(),
                enhanced_versions: vec![EnhancedVersion::new("Formal", "Greetings.")],
                suggestions: vec!["Add a subject".to_string()],
                explanation: "Short greeting.".to_string(),
            },
            context: None,
            service: None,
            note: None,
            conversation_id: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["detected_tone"], "casual");
        assert!(json["context"].is_null());
        assert!(json.get("service").is_none());

        let back: AnalysisResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }
}

//! Deterministic fallback analysis.
//!
//! Used whenever the backend is unavailable or its reply is unusable.
//! Output depends only on the arguments.

use crate::constants::fallback;
use crate::types::{AnalysisResult, EnhancedVersion};

const GENERIC_SUGGESTIONS: [&str; 3] = [
    "Consider your audience when choosing tone",
    "Ensure your message aligns with your intent",
    "Review for clarity and impact",
];

const FORMAL_SUGGESTIONS: [&str; 3] = [
    "Use complete sentences",
    "Avoid contractions",
    "Maintain professional vocabulary",
];

const CASUAL_SUGGESTIONS: [&str; 3] = [
    "Use conversational language",
    "Feel free to use contractions",
    "Keep it relaxed and friendly",
];

const PROFESSIONAL_SUGGESTIONS: [&str; 3] = [
    "Be clear and concise",
    "Focus on key points",
    "Maintain respectful language",
];

/// Three template rewrites: Professional, Friendly, Formal
pub fn fallback_enhancements(text: &str) -> Vec<EnhancedVersion> {
    vec![
        EnhancedVersion::new(
            "Professional",
            format!("We would like to discuss the following matter: {}", text),
        ),
        EnhancedVersion::new("Friendly", format!("Hey! Just wanted to share: {}", text)),
        EnhancedVersion::new("Formal", format!("It is important to note that: {}", text)),
    ]
}

/// Suggestions keyed by exact lowercased tone, generic list otherwise
pub fn fallback_suggestions(tone: &str) -> Vec<String> {
    let table: &[&str] = match tone.to_lowercase().as_str() {
        "formal" => &FORMAL_SUGGESTIONS,
        "casual" => &CASUAL_SUGGESTIONS,
        "professional" => &PROFESSIONAL_SUGGESTIONS,
        _ => &GENERIC_SUGGESTIONS,
    };
    table.iter().map(|s| s.to_string()).collect()
}

/// Complete neutral analysis of `text`
pub fn fallback_analysis(text: &str) -> AnalysisResult {
    AnalysisResult {
        original_text: text.to_string(),
        detected_tone: fallback::TONE.to_string(),
        confidence: fallback::CONFIDENCE,
        tone_category: fallback::CATEGORY.to_string(),
        enhanced_versions: fallback_enhancements(text),
        suggestions: fallback_suggestions(fallback::TONE),
        explanation: fallback::EXPLANATION.to_string(),
    }
}

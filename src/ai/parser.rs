//! Tolerant Reply Parser
//!
//! Turns the line-oriented reply requested by `ai::prompt` into an
//! [`AnalysisResult`]. Unknown lines are ignored, missing fields keep their
//! defaults and empty lists are filled from `ai::fallback`. Scanning has no
//! failure mode: even an empty reply yields the defaults.
//!
//! ## Reply shape
//!
//! ```text
//! DETECTED_TONE: casual
//! CONFIDENCE: 0.85
//! TONE_CATEGORY: casual
//! EXPLANATION: Informal abbreviations.
//! ENHANCED_VERSIONS:
//! 1. Professional: Could you please send the report?
//! SUGGESTIONS:
//! - Avoid abbreviations like "u"
//! ```

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::fallback::{fallback_enhancements, fallback_suggestions};
use super::prompt::keys;
use crate::constants::parser::{
    DEFAULT_CATEGORY, DEFAULT_CONFIDENCE, DEFAULT_EXPLANATION, DEFAULT_TONE,
};
use crate::types::{AnalysisResult, EnhancedVersion};

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("numbered item pattern is valid"));

/// Section cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Enhanced,
    Suggestions,
}

/// Case-insensitive `KEYWORD:` prefix test
fn has_key(lower: &str, key: &str) -> bool {
    lower
        .strip_prefix(key.to_lowercase().as_str())
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Text after the first colon, trimmed
fn value_after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, v)| v.trim()).unwrap_or("")
}

/// `N. Label: text` → (`Label`, `text`)
fn parse_enhanced_line(line: &str) -> Option<EnhancedVersion> {
    if !NUMBERED_ITEM.is_match(line) {
        return None;
    }
    let (head, text) = line.split_once(':')?;
    let label = head.split_once('.').map(|(_, l)| l).unwrap_or(head);
    Some(EnhancedVersion::new(label.trim(), text.trim()))
}

fn parse_confidence(value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(c) if c.is_finite() => c,
        _ => {
            debug!(value, "Unreadable confidence, using default");
            DEFAULT_CONFIDENCE
        }
    }
}

/// Parse a reply into an analysis. Never fails.
pub fn parse(raw_text: &str, original_text: &str) -> AnalysisResult {
    let lines = raw_text.lines().map(str::trim).filter(|l| !l.is_empty());

    let mut detected_tone = DEFAULT_TONE.to_string();
    let mut confidence = DEFAULT_CONFIDENCE;
    let mut tone_category = DEFAULT_CATEGORY.to_string();
    let mut explanation = DEFAULT_EXPLANATION.to_string();
    let mut enhanced_versions = Vec::new();
    let mut suggestions = Vec::new();
    let mut section = Section::None;

    for line in lines {
        let lower = line.to_lowercase();

        if has_key(&lower, keys::DETECTED_TONE) {
            detected_tone = value_after_colon(line).to_string();
        } else if has_key(&lower, keys::CONFIDENCE) {
            confidence = parse_confidence(value_after_colon(line));
        } else if has_key(&lower, keys::TONE_CATEGORY) {
            tone_category = value_after_colon(line).to_string();
        } else if has_key(&lower, keys::EXPLANATION) {
            explanation = value_after_colon(line).to_string();
        } else if has_key(&lower, keys::ENHANCED_VERSIONS) {
            section = Section::Enhanced;
            continue;
        } else if has_key(&lower, keys::SUGGESTIONS) {
            section = Section::Suggestions;
            continue;
        }

        match section {
            Section::Enhanced => {
                if let Some(version) = parse_enhanced_line(line) {
                    enhanced_versions.push(version);
                }
            }
            Section::Suggestions => {
                if let Some(rest) = line.strip_prefix('-') {
                    let suggestion = rest.trim();
                    if !suggestion.is_empty() {
                        suggestions.push(suggestion.to_string());
                    }
                }
            }
            Section::None => {}
        }
    }

    if enhanced_versions.is_empty() {
        enhanced_versions = fallback_enhancements(original_text);
    }
    if suggestions.is_empty() {
        suggestions = fallback_suggestions(&detected_tone);
    }

    AnalysisResult {
        original_text: original_text.to_string(),
        detected_tone,
        confidence,
        tone_category,
        enhanced_versions,
        suggestions,
        explanation,
    }
}

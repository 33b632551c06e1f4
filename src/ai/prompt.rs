//! Prompt Builder
//!
//! Builds the tone-analysis prompt. The reply format it asks for is the one
//! `ai::parser` reads, so both sides share the keywords in [`keys`].
//!
//! ## Layout
//!
//! 1. Task statement
//! 2. Optional `Context:` line and the quoted input text
//! 3. Output template (scalar fields, numbered rewrites, bulleted suggestions)
//! 4. Enhancement guidelines
//! 5. Tone labels available for rewrites

use crate::types::ToneCategory;

/// Reply keywords shared with the parser
pub mod keys {
    pub const DETECTED_TONE: &str = "DETECTED_TONE";
    pub const CONFIDENCE: &str = "CONFIDENCE";
    pub const TONE_CATEGORY: &str = "TONE_CATEGORY";
    pub const EXPLANATION: &str = "EXPLANATION";
    pub const ENHANCED_VERSIONS: &str = "ENHANCED_VERSIONS";
    pub const SUGGESTIONS: &str = "SUGGESTIONS";
}

const TASK: &str =
    "Analyze the tone of the following text and provide enhanced versions in different tones.";

const GUIDELINES: [&str; 4] = [
    "Keep the core meaning intact",
    "Make enhancements natural and context-appropriate",
    "Ensure each enhanced version clearly demonstrates the target tone",
    "Provide practical, actionable suggestions",
];

/// Number of numbered rewrites and bullet suggestions requested
const TEMPLATE_ITEMS: usize = 3;

/// Prompt section types
#[derive(Debug, Clone)]
enum PromptSection {
    /// Plain paragraph
    Text(String),
    /// `KEYWORD: [placeholder]` fields
    Fields(Vec<(&'static str, String)>),
    /// `KEYWORD:` followed by one line per item
    Block {
        keyword: &'static str,
        items: Vec<String>,
    },
    /// Header line followed by `- ` bullets
    Bullets { header: String, items: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Text(content.into()));
        self
    }

    pub fn fields(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.sections.push(PromptSection::Fields(fields));
        self
    }

    pub fn block(mut self, keyword: &'static str, items: Vec<String>) -> Self {
        self.sections.push(PromptSection::Block { keyword, items });
        self
    }

    pub fn bullets(mut self, header: impl Into<String>, items: Vec<String>) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.into(),
            items,
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Text(content) => {
                    prompt.push_str(&content);
                    prompt.push('\n');
                }
                PromptSection::Fields(fields) => {
                    for (keyword, placeholder) in fields {
                        prompt.push_str(&format!("{}: [{}]\n", keyword, placeholder));
                    }
                }
                PromptSection::Block { keyword, items } => {
                    prompt.push_str(&format!("{}:\n", keyword));
                    for item in items {
                        prompt.push_str(&item);
                        prompt.push('\n');
                    }
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&header);
                    prompt.push('\n');
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                }
            }
            prompt.push('\n');
        }

        prompt.trim_end().to_string()
    }
}

/// Capitalized rewrite labels, e.g. `Formal, Casual, ...`
fn enhancement_tones() -> String {
    ToneCategory::ALL
        .iter()
        .filter(|c| **c != ToneCategory::Neutral)
        .map(|c| {
            let name = c.as_str();
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the analysis prompt for `text`.
///
/// The text is embedded verbatim between double quotes; no escaping is applied.
pub fn build_prompt(text: &str, context: Option<&str>) -> String {
    let mut input = String::new();
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        input.push_str(&format!("Context: {}\n", context));
    }
    input.push_str(&format!("Text to analyze: \"{}\"", text));

    let categories = ToneCategory::vocabulary().join("/");

    PromptBuilder::new()
        .text(TASK)
        .text(input)
        .text("Please provide your response in this exact format:")
        .fields(vec![
            (keys::DETECTED_TONE, "primary tone name".to_string()),
            (keys::CONFIDENCE, "0.XX".to_string()),
            (keys::TONE_CATEGORY, categories),
            (
                keys::EXPLANATION,
                "brief explanation of why this tone was detected".to_string(),
            ),
        ])
        .block(
            keys::ENHANCED_VERSIONS,
            (1..=TEMPLATE_ITEMS)
                .map(|n| format!("{}. [Tone Name]: [Enhanced version of the text]", n))
                .collect(),
        )
        .block(
            keys::SUGGESTIONS,
            (1..=TEMPLATE_ITEMS)
                .map(|n| format!("- [Suggestion {}]", n))
                .collect(),
        )
        .bullets(
            "Guidelines for enhancement:",
            GUIDELINES.iter().map(|g| g.to_string()).collect(),
        )
        .text(format!(
            "Available tones for enhancement: {}.",
            enhancement_tones()
        ))
        .build()
}

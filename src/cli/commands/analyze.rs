//! Analyze Command
//!
//! Usage:
//!   toneweave analyze <TEXT> [--context C] [-f json] [--no-save]

use tracing::debug;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, print_json};
use crate::service::ToneService;
use crate::types::{AnalysisRequest, AnalysisResponse, Result};

pub async fn run(
    ctx: CommandContext,
    text: String,
    context: Option<String>,
    format: OutputFormat,
    no_save: bool,
) -> Result<()> {
    let ctx = if no_save { ctx.without_storage() } else { ctx };
    let service = ToneService::from_config(&ctx.config).await?;

    let mut request = AnalysisRequest::new(text);
    if let Some(context) = context {
        request = request.with_context(context);
    }

    let response = service.analyze(request).await?;
    debug!("Engine stats:\n{}", service.engine().stats().snapshot().display());

    if format.is_json() {
        print_json(&response)
    } else {
        render(&response);
        Ok(())
    }
}

fn render(response: &AnalysisResponse) {
    let out = Output::new();
    let result = &response.result;

    out.header("Tone Analysis");
    if let Some(note) = &response.note {
        out.warning(note);
    }

    out.field("Detected tone", &result.detected_tone);
    out.field("Category", &result.tone_category);
    out.field("Confidence", &out.confidence(result.confidence));
    if let Some(context) = &response.context {
        out.field("Context", context);
    }
    out.field("Explanation", &result.explanation);

    out.section("Enhanced versions");
    for (i, version) in result.enhanced_versions.iter().enumerate() {
        out.numbered(i + 1, &version.tone, &version.text);
    }

    out.section("Suggestions");
    for suggestion in &result.suggestions {
        out.bullet(suggestion);
    }

    if let Some(id) = &response.conversation_id {
        println!();
        out.info(&format!("Saved as {}", id));
    }
}

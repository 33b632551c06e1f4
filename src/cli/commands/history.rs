//! History Command
//!
//! Browse stored analyses.
//!
//! Usage:
//!   toneweave history list [-f json]
//!   toneweave history show <ID> [-f json]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, print_json, truncate};
use crate::storage::Database;
use crate::types::{Result, ToneError};

fn open(ctx: &CommandContext) -> Result<Database> {
    let path = &ctx.config.storage.database_path;
    if !path.exists() {
        return Err(ToneError::NotFound(format!(
            "No history database at {}. Run 'toneweave analyze' first.",
            path.display()
        )));
    }

    let db = Database::open(path)?;
    db.initialize()?;
    Ok(db)
}

pub fn list(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let conversations = open(ctx)?.list_conversations()?;

    if format.is_json() {
        return print_json(&conversations);
    }

    let out = Output::new();
    out.header(&format!("History ({} analyses)", conversations.len()));
    if conversations.is_empty() {
        out.info("No analyses stored yet.");
        return Ok(());
    }

    for c in &conversations {
        println!(
            "{}  {}  {:<12}  {}",
            c.id,
            c.created_at.format("%Y-%m-%d %H:%M"),
            c.detected_tone.as_deref().unwrap_or("-"),
            truncate(&c.original_text, 48)
        );
    }
    Ok(())
}

pub fn show(ctx: &CommandContext, id: &str, format: OutputFormat) -> Result<()> {
    let detail = open(ctx)?
        .get_conversation(id)?
        .ok_or_else(|| ToneError::NotFound(format!("Conversation {}", id)))?;

    if format.is_json() {
        return print_json(&detail);
    }

    let out = Output::new();
    let analysis = &detail.analysis.result;

    out.header(&format!("Conversation {}", detail.summary.id));
    out.field("Created", &detail.summary.created_at.to_rfc3339());
    if let Some(context) = &detail.summary.context {
        out.field("Context", context);
    }
    out.field("Text", &detail.summary.original_text);
    out.field("Detected tone", &analysis.detected_tone);
    out.field("Confidence", &out.confidence(analysis.confidence));
    if let Some(service) = &detail.analysis.service {
        out.field("Service", service);
    }

    out.section("Enhanced versions");
    for (i, version) in analysis.enhanced_versions.iter().enumerate() {
        out.numbered(i + 1, &version.tone, &version.text);
    }

    out.section("Suggestions");
    for suggestion in &analysis.suggestions {
        out.bullet(suggestion);
    }
    Ok(())
}

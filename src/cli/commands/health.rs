//! Health Command
//!
//! Initialize the engine against the configured backend and report its state.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, print_json};
use crate::service::ToneService;
use crate::types::Result;

pub async fn run(ctx: CommandContext, format: OutputFormat) -> Result<()> {
    let service = ToneService::from_config(&ctx.without_storage().config).await?;
    let health = service.health();

    if format.is_json() {
        return print_json(&health);
    }

    let out = Output::new();
    out.header("toneweave Health");
    out.field("Status", &health.status);
    out.field(
        "Backend",
        health.backend.as_deref().unwrap_or("(not configured)"),
    );
    out.field(
        "Active model",
        health.active_model.as_deref().unwrap_or("(none)"),
    );
    out.field(
        "Call interval",
        &format!("{:.1}s", health.rate_limit_delay_secs),
    );

    println!();
    if health.backend_available {
        out.success("Generation backend available");
    } else {
        out.warning("Generation backend unavailable, analyses will use smart fallback");
    }

    let candidates = service.engine().candidate_models();
    if !candidates.is_empty() && !health.backend_available {
        out.section("Tried models");
        for model in candidates {
            out.bullet(model);
        }
    }

    Ok(())
}

//! Config Command
//!
//! Manage toneweave configuration.
//!
//! Usage:
//!   toneweave config show [-f json]
//!   toneweave config path
//!   toneweave config init [-g] [--force]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, print_json};
use crate::config::ConfigLoader;
use crate::types::{Result, ToneError};

/// Show the effective configuration (API key omitted)
pub fn show(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    if format.is_json() {
        return print_json(&ctx.config);
    }

    let rendered =
        toml::to_string_pretty(&ctx.config).map_err(|e| ToneError::Config(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

/// Show configuration file paths
pub fn path(ctx: &CommandContext) -> Result<()> {
    let mark = |exists: bool| if exists { "✓" } else { "✗" };

    println!("Configuration paths:");
    println!();

    if let Some(explicit) = &ctx.config_path {
        println!("  --config: {} {}", mark(explicit.exists()), explicit.display());
    }

    match ConfigLoader::global_config_path() {
        Some(global) => println!("  Global:   {} {}", mark(global.exists()), global.display()),
        None => println!("  Global:   (not available)"),
    }

    let project = ConfigLoader::project_config_path();
    println!("  Project:  {} {}", mark(project.exists()), project.display());

    let db = &ctx.config.storage.database_path;
    println!("  History:  {} {}", mark(db.exists()), db.display());
    Ok(())
}

/// Write a starter config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let (path, written) = ConfigLoader::init(global, force)?;

    if written {
        out.success(&format!("Created {}", path.display()));
    } else {
        out.info(&format!(
            "Config already exists: {} (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}

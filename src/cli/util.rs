//! CLI Common Utilities
//!
//! Shared context and output helpers for command handlers.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Output format accepted by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

/// Command execution context
///
/// Resolved configuration plus the file it was loaded from, if any.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    /// Explicit `--config` file
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Load configuration from `--config` if given, else the full resolution chain
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        Ok(Self {
            config,
            config_path: config_path.map(Path::to_path_buf),
        })
    }

    /// Same context with history persistence turned off
    pub fn without_storage(mut self) -> Self {
        self.config.storage.enabled = false;
        self
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten `text` to `max` characters, appending `…` when cut
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

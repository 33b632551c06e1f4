//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/toneweave/config.toml)
//! 3. Project config (.toneweave/config.toml)
//! 4. Environment variables (TONEWEAVE_* prefix, `__` between nested keys)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, ToneError};

const ENV_PREFIX: &str = "TONEWEAVE_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolve with explicit global/project files (missing files are skipped)
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        Self::finish(figment)
    }

    /// Load a specific file on top of defaults; env vars still apply
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(ToneError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));

        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Config> {
        // e.g. TONEWEAVE_BACKEND__PROVIDER -> backend.provider
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ToneError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/toneweave/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("toneweave"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".toneweave")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter config file. Returns the path and whether it was written.
    pub fn init(global: bool, force: bool) -> Result<(PathBuf, bool)> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                ToneError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        let written = Self::write_default(&path, force)?;
        Ok((path, written))
    }

    /// Write the default config to `path` unless it exists and `force` is unset
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    /// Default config content (TOML)
    fn default_config() -> String {
        r#"# toneweave configuration
# Project settings in .toneweave/config.toml override ~/.config/toneweave/config.toml.
# Environment variables override both, e.g. TONEWEAVE_BACKEND__PROVIDER=ollama.

version = "1.0"

[backend]
# "gemini" (needs GEMINI_API_KEY) or "ollama"
provider = "gemini"
timeout_secs = 60
temperature = 0.7
# api_base = "http://localhost:11434"
# fallback_models = ["gemini-1.5-flash"]

[rate_limit]
base_interval_ms = 2000
overload_increment_ms = 2000

[storage]
enabled = true
database_path = ".toneweave/toneweave.db"
"#
        .to_string()
    }
}

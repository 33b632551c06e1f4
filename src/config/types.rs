//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/toneweave/) and project (.toneweave/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{network, rate_limit};
use crate::types::{Result, ToneError};

/// Providers `create_backend` knows how to build
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation backend settings
    pub backend: BackendConfig,

    /// Backend call spacing
    pub rate_limit: RateLimitConfig,

    /// Analysis history settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::default(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ToneError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.backend.provider.as_str()) {
            return Err(ToneError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.backend.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ToneError::Config(format!(
                "Backend temperature must be between 0.0 and 2.0, got {}",
                self.backend.temperature
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ToneError::Config(
                "Backend timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.base_interval_ms == 0 {
            return Err(ToneError::Config(
                "Rate limit base_interval_ms must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("base_interval_ms", self.rate_limit.base_interval_ms),
            ("overload_increment_ms", self.rate_limit.overload_increment_ms),
        ] {
            if value > rate_limit::MAX_INTERVAL_MS {
                return Err(ToneError::Config(format!(
                    "Rate limit {} must be at most {}, got {}",
                    name,
                    rate_limit::MAX_INTERVAL_MS,
                    value
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Provider name (`gemini` or `ollama`)
    pub provider: String,

    /// API key; falls back to `GEMINI_API_KEY`. Never written out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Override for the provider's REST base URL
    pub api_base: Option<String>,

    /// Replaces the provider's built-in known-good model list
    pub fallback_models: Option<Vec<String>>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("fallback_models", &self.fallback_models)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            api_base: None,
            fallback_models: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
        }
    }
}

// =============================================================================
// Rate Limit Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Initial minimum spacing between backend calls
    pub base_interval_ms: u64,

    /// Spacing added after each quota/overload signal
    pub overload_increment_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: rate_limit::BASE_INTERVAL_MS,
            overload_increment_ms: rate_limit::OVERLOAD_INCREMENT_MS,
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist analyses to the history database
    pub enabled: bool,

    /// SQLite database location
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: PathBuf::from(".toneweave/toneweave.db"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

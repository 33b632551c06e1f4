//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Input contract constants
pub mod input {
    /// Maximum accepted text length (characters)
    pub const MAX_TEXT_CHARS: usize = 1000;
}

/// Rate limiter constants
pub mod rate_limit {
    /// Initial minimum spacing between backend calls (milliseconds)
    pub const BASE_INTERVAL_MS: u64 = 2000;

    /// Spacing added per overload signal (milliseconds)
    pub const OVERLOAD_INCREMENT_MS: u64 = 2000;

    /// Ceiling for the spacing and for each configured step: one day (milliseconds)
    pub const MAX_INTERVAL_MS: u64 = 86_400_000;
}

/// Backend selection constants
pub mod selector {
    /// Prompt used to smoke-test a candidate model
    pub const SMOKE_TEST_PROMPT: &str = "Say 'OK'";

    /// Operation name a model must advertise to be a discovery candidate
    pub const GENERATE_OPERATION: &str = "generateContent";
}

/// Parser defaults applied before scanning a reply
pub mod parser {
    pub const DEFAULT_TONE: &str = "neutral";
    pub const DEFAULT_CONFIDENCE: f64 = 0.8;
    pub const DEFAULT_CATEGORY: &str = "neutral";
    pub const DEFAULT_EXPLANATION: &str = "The tone appears balanced and neutral.";
}

/// Fallback generator constants
pub mod fallback {
    pub const TONE: &str = "neutral";
    pub const CONFIDENCE: f64 = 0.7;
    pub const CATEGORY: &str = "neutral";
    pub const EXPLANATION: &str =
        "The text appears to have a neutral tone, suitable for general communication.";
}

/// Service layer constants
pub mod service {
    /// `service` marker attached to degraded responses
    pub const FALLBACK_SERVICE: &str = "smart-fallback";

    /// Advisory note attached to degraded responses
    pub const FALLBACK_NOTE: &str = "Generation backend unavailable. Using smart fallback analysis.";

    pub const SUPPORTED_TONES_DESCRIPTION: &str =
        "Available tone categories for analysis and enhancement";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

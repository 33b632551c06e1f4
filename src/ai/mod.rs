//! AI Integration Layer
//!
//! Backend access, model selection, call pacing, prompt/reply handling and the
//! engine that ties them together.

pub mod backend;
pub mod engine;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod rate_limiter;
pub mod selector;
pub mod stats;

pub use backend::{
    GeminiBackend, GenerationBackend, ModelInfo, OllamaBackend, SharedBackend, create_backend,
};
pub use engine::{EngineState, ToneEngine};
pub use fallback::{fallback_analysis, fallback_enhancements, fallback_suggestions};
pub use parser::parse;
pub use prompt::{PromptBuilder, build_prompt};
pub use rate_limiter::RateLimiter;
pub use selector::{Selection, candidate_models, select_model};
pub use stats::{EngineStats, StatsSnapshot};

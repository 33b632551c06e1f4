//! toneweave - Tone Analysis Engine
//!
//! Detects the tone of a short text with an LLM backend and proposes
//! rewrites in other tones. When no backend is usable the engine still
//! answers, with a deterministic fallback analysis.
//!
//! ## Core Features
//!
//! - **Backend Selection**: model discovery plus smoke test, first responsive model wins
//! - **Rate Limiting**: serialized call slots with overload back-off
//! - **Tolerant Parsing**: line-oriented reply parser that never fails
//! - **Smart Fallback**: deterministic analysis when the backend is unavailable
//! - **History**: SQLite persistence of every analysis
//!
//! ## Quick Start
//!
//! ```ignore
//! use toneweave::{AnalysisRequest, ConfigLoader, ToneService};
//!
//! let config = ConfigLoader::load()?;
//! let service = ToneService::from_config(&config).await?;
//! let response = service
//!     .analyze(AnalysisRequest::new("hey, can u send the file?"))
//!     .await?;
//! println!("{} ({:.0}%)", response.result.detected_tone, response.result.confidence * 100.0);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: backends, selector, rate limiter, prompt, parser, fallback, engine
//! - [`service`]: request validation, history persistence, health
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod service;
pub mod storage;
pub mod types;

// Configuration
pub use config::{BackendConfig, Config, ConfigLoader, RateLimitConfig, StorageConfig};

// Error Types
pub use types::error::{ErrorCategory, Result, ResultExt, ToneError};

// Domain Types
pub use types::{
    AnalysisOutcome, AnalysisRequest, AnalysisResponse, AnalysisResult, AnalysisSource,
    EnhancedVersion, FallbackReason, ToneCategory,
};

// Storage
pub use storage::{Database, PoolConfig, SharedDatabase};

// Engine
pub use ai::{EngineState, GenerationBackend, RateLimiter, SharedBackend, ToneEngine};
pub use service::ToneService;

pub mod analysis;
pub mod error;

pub use analysis::{
    AnalysisOutcome, AnalysisRequest, AnalysisResponse, AnalysisResult, AnalysisSource,
    EnhancedVersion, FallbackReason, ToneCategory,
};
pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, Result, ResultExt, ToneError, ValidationError,
    ValidationErrorKind,
};

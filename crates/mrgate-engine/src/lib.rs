//! mrgate engine - orchestration layer
//!
//! Wraps the pure evaluation core with input validation, operation boundary
//! logging, settings loading and a caller-owned result cache.

pub mod cache;
pub mod commands;
pub mod settings;

pub use cache::{rule_digest, CacheKey, EvaluationCache};
pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::evaluate::{
    evaluate_merge_request, evaluate_rule, finalize_merge_request, FinalizeReport,
    MergeRequestInput,
};
pub use settings::{EngineSettings, LoggingSettings};

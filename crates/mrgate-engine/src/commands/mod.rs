//! Command orchestration layer.
//!
//! Command handlers validate their inputs, run the core evaluation and own
//! operation boundary logging.

pub mod engine_command;
pub mod evaluate;

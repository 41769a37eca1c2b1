//! Structured logging facility for mrgate
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! The engine crate owns operation boundaries and is the only caller of the
//! macros. Evaluation code in this crate logs with `tracing::debug!` only.
//!
//! # Usage
//!
//! ```rust
//! use mrgate_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

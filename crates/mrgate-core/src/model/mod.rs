//! Evaluation inputs
//!
//! Everything here is supplied by the caller and treated as read-only during
//! an evaluation. The only mutation paths are the explicit finalisation
//! operations in [`crate::finalize`].

pub mod activity;
pub mod merge_request;
pub mod rule;
pub mod user;

pub use activity::{Approval, Comment};
pub use merge_request::{
    MergeRequestSnapshot, MergeRequestState, PolicyApprovalOverrides, ProjectSettings,
};
pub use rule::{PolicyConfig, PolicyReportType, ReportType, Rule, RuleKind, RuleSource};
pub use user::{ApproverGroup, UserId};

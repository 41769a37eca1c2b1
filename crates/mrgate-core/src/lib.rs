//! mrgate core - merge request approval rule evaluation
//!
//! Evaluates approval rules against a read-only snapshot of a merge request:
//! - approver set resolution (eligible, approved, unactioned, commented)
//! - required approval counting with fail-open / fail-closed handling
//! - code owner requirements driven by branch protection
//! - any-approver rules
//! - aggregate approval state and rule finalisation at merge
//!
//! Evaluation performs no I/O and never fails. Errors only arise from rule
//! definition validation and finalisation preconditions.

pub mod any_approver;
pub mod approval_state;
pub mod approvers;
pub mod code_owner;
pub mod context;
pub mod errors;
pub mod failure_mode;
pub mod features;
pub mod finalize;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod requirement;
pub mod rules;
pub mod wrapped_rule;

// Used by the logging macros
pub use mrgate_core_types;

// Re-export commonly used types
pub use approval_state::{ApprovalState, ApprovalSummary, RuleSummary};
pub use approvers::{ApproverSet, ApproverSetResolver};
pub use context::EvaluationContext;
pub use errors::{ExError, ExErrorKind, MrgateError, Result};
pub use features::LicensedFeatures;
pub use model::{Approval, Comment, MergeRequestSnapshot, Rule, RuleKind, UserId};
pub use policy::{ApproverAccess, BranchProtection};
pub use wrapped_rule::{evaluate, EvaluationResult, WrappedRule};

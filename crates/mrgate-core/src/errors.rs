use mrgate_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using MrgateError
pub type Result<T> = std::result::Result<T, MrgateError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Evaluation itself never fails; these kinds cover the edges around it:
/// rule definition validation, finalisation preconditions and settings.
/// Each kind maps to a stable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Rule definition
    InvalidInput,
    InvalidRuleName,
    InvalidApprovalsRequired,
    ApproversNotAllowed,
    DuplicateRuleName,
    DuplicateAnyApproverRule,

    // Finalisation
    NotMerged,
    NotCodeOwnerRule,

    // Settings
    InvalidSettings,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidRuleName => "ERR_INVALID_RULE_NAME",
            ExErrorKind::InvalidApprovalsRequired => "ERR_INVALID_APPROVALS_REQUIRED",
            ExErrorKind::ApproversNotAllowed => "ERR_APPROVERS_NOT_ALLOWED",
            ExErrorKind::DuplicateRuleName => "ERR_DUPLICATE_RULE_NAME",
            ExErrorKind::DuplicateAnyApproverRule => "ERR_DUPLICATE_ANY_APPROVER_RULE",
            ExErrorKind::NotMerged => "ERR_NOT_MERGED",
            ExErrorKind::NotCodeOwnerRule => "ERR_NOT_CODE_OWNER_RULE",
            ExErrorKind::InvalidSettings => "ERR_INVALID_SETTINGS",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a stable classification for programmatic handling plus optional
/// context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    rule_id: Option<u64>,
    merge_request_id: Option<u64>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            rule_id: None,
            merge_request_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add rule ID context
    pub fn with_rule_id(mut self, rule_id: u64) -> Self {
        self.rule_id = Some(rule_id);
        self
    }

    /// Add merge request ID context
    pub fn with_merge_request_id(mut self, merge_request_id: u64) -> Self {
        self.merge_request_id = Some(merge_request_id);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn rule_id(&self) -> Option<u64> {
        self.rule_id
    }

    pub fn merge_request_id(&self) -> Option<u64> {
        self.merge_request_id
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(rule_id) = self.rule_id {
            write!(f, " (rule_id: {})", rule_id)?;
        }
        if let Some(merge_request_id) = self.merge_request_id {
            write!(f, " (merge_request_id: {})", merge_request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for mrgate operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MrgateError {
    // ===== Rule Definition Errors =====
    /// Rule name is empty or too long
    #[error("Invalid name for rule {rule_id}: {reason}")]
    InvalidRuleName { rule_id: u64, reason: String },

    /// approvals_required outside the accepted range
    #[error("Rule {rule_id} requires {value} approvals, expected 0..={max}")]
    ApprovalsRequiredOutOfRange { rule_id: u64, value: i32, max: u32 },

    /// Any-approver rules are open to every eligible user and carry no approver list
    #[error("Any-approver rule {rule_id} must not list explicit approvers")]
    AnyApproverWithApprovers { rule_id: u64 },

    /// Two rules in the same scope share a name
    #[error("Rules {first_rule_id} and {second_rule_id} share the name '{name}'")]
    DuplicateRuleName {
        name: String,
        first_rule_id: u64,
        second_rule_id: u64,
    },

    /// More than one any-approver rule for the same post-merge scope
    #[error("Rule {rule_id} duplicates the any-approver rule (applicable_post_merge: {applicable_post_merge:?})")]
    DuplicateAnyApproverRule {
        rule_id: u64,
        applicable_post_merge: Option<bool>,
    },

    // ===== Finalisation Errors =====
    /// Operation only valid once the merge request is merged
    #[error("Merge request {merge_request_id} is not merged")]
    MergeRequestNotMerged { merge_request_id: u64 },

    /// Operation only valid for code owner rules
    #[error("Rule {rule_id} is not a code owner rule")]
    NotCodeOwnerRule { rule_id: u64 },

    // ===== Settings Errors =====
    /// Settings document failed to parse or contained invalid values
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from MrgateError to the canonical ExError
impl From<MrgateError> for ExError {
    fn from(err: MrgateError) -> Self {
        let message = err.to_string();
        match err {
            MrgateError::InvalidRuleName { rule_id, .. } => {
                ExError::new(ExErrorKind::InvalidRuleName).with_rule_id(rule_id)
            }
            MrgateError::ApprovalsRequiredOutOfRange { rule_id, .. } => {
                ExError::new(ExErrorKind::InvalidApprovalsRequired).with_rule_id(rule_id)
            }
            MrgateError::AnyApproverWithApprovers { rule_id } => {
                ExError::new(ExErrorKind::ApproversNotAllowed).with_rule_id(rule_id)
            }
            MrgateError::DuplicateRuleName { second_rule_id, .. } => {
                ExError::new(ExErrorKind::DuplicateRuleName).with_rule_id(second_rule_id)
            }
            MrgateError::DuplicateAnyApproverRule { rule_id, .. } => {
                ExError::new(ExErrorKind::DuplicateAnyApproverRule).with_rule_id(rule_id)
            }
            MrgateError::MergeRequestNotMerged { merge_request_id } => {
                ExError::new(ExErrorKind::NotMerged)
                    .with_op("finalize")
                    .with_merge_request_id(merge_request_id)
            }
            MrgateError::NotCodeOwnerRule { rule_id } => ExError::new(ExErrorKind::NotCodeOwnerRule)
                .with_op("finalize")
                .with_rule_id(rule_id),
            MrgateError::InvalidSettings { .. } => ExError::new(ExErrorKind::InvalidSettings),
            MrgateError::Serialization { .. } => ExError::new(ExErrorKind::Serialization),
        }
        .with_message(message)
    }
}

//! Canonical schema constants for structured logging
//!
//! These constants keep field names stable across the core and engine crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_RULE_ID: &str = "rule_id";
pub const FIELD_MERGE_REQUEST_ID: &str = "merge_request_id";
pub const FIELD_STATE_VERSION: &str = "state_version";

// Evaluation outcome
pub const FIELD_RULE_COUNT: &str = "rule_count";
pub const FIELD_APPROVALS_LEFT: &str = "approvals_left";
pub const FIELD_APPROVED: &str = "approved";
pub const FIELD_INVALID_RULE: &str = "invalid_rule";
pub const FIELD_CACHE_HIT: &str = "cache_hit";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{ApproverGroup, UserId};

/// Upper bound accepted for `approvals_required`
pub const APPROVALS_REQUIRED_MAX: u32 = 100;

/// Maximum rule name length, in characters
pub const NAME_LENGTH_LIMIT: usize = 255;

/// Section assigned to code owner rules that have no explicit section
pub const DEFAULT_CODE_OWNER_SECTION: &str = "codeowners";

/// Report type a rule is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    CodeOwner,
    AnyApprover,
    ScanFinding,
    LicenseScanning,
    CodeCoverage,
    AnyMergeRequest,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::CodeOwner => "code_owner",
            ReportType::AnyApprover => "any_approver",
            ReportType::ScanFinding => "scan_finding",
            ReportType::LicenseScanning => "license_scanning",
            ReportType::CodeCoverage => "code_coverage",
            ReportType::AnyMergeRequest => "any_merge_request",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report types a scan result policy can materialise rules for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReportType {
    ScanFinding,
    LicenseScanning,
    AnyMergeRequest,
}

impl From<PolicyReportType> for ReportType {
    fn from(value: PolicyReportType) -> Self {
        match value {
            PolicyReportType::ScanFinding => ReportType::ScanFinding,
            PolicyReportType::LicenseScanning => ReportType::LicenseScanning,
            PolicyReportType::AnyMergeRequest => ReportType::AnyMergeRequest,
        }
    }
}

/// What kind of requirement a rule expresses
///
/// The report type is derived from the variant, so a code owner rule always
/// reports `code_owner` and an any-approver rule always reports `any_approver`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// Named approvers, optionally bound to the code coverage report
    Regular {
        #[serde(default)]
        code_coverage: bool,
    },

    /// Any eligible user may approve
    AnyApprover,

    /// Generated from a CODEOWNERS section
    CodeOwner { section: String },

    /// Materialised by a scan result policy action
    ScanResultPolicy {
        report_type: PolicyReportType,
        #[serde(default)]
        orchestration_policy_idx: Option<u32>,
        #[serde(default)]
        action_idx: Option<u32>,
    },
}

impl RuleKind {
    pub fn regular() -> Self {
        RuleKind::Regular {
            code_coverage: false,
        }
    }

    pub fn code_owner(section: impl Into<String>) -> Self {
        RuleKind::CodeOwner {
            section: section.into(),
        }
    }

    pub fn scan_result_policy(
        report_type: PolicyReportType,
        orchestration_policy_idx: u32,
        action_idx: u32,
    ) -> Self {
        RuleKind::ScanResultPolicy {
            report_type,
            orchestration_policy_idx: Some(orchestration_policy_idx),
            action_idx: Some(action_idx),
        }
    }

    /// Short tag used for name-uniqueness scoping and log fields
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::Regular { .. } => "regular",
            RuleKind::AnyApprover => "any_approver",
            RuleKind::CodeOwner { .. } => "code_owner",
            RuleKind::ScanResultPolicy { .. } => "scan_result_policy",
        }
    }
}

/// Where the rule definition lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// Rule owned by (or copied onto) the merge request
    #[default]
    MergeRequest,
    /// Project-level rule evaluated against the merge request directly
    Project,
}

/// Scan result policy configuration linked to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Unsatisfiable rules let the merge request through instead of blocking it
    #[serde(default)]
    pub fail_open: bool,
}

impl PolicyConfig {
    pub fn fail_open() -> Self {
        Self { fail_open: true }
    }

    pub fn fail_closed() -> Self {
        Self { fail_open: false }
    }
}

/// An approval rule definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    pub kind: RuleKind,

    /// Stored requirement; negative values are treated as 0
    pub approvals_required: i32,

    /// Explicitly configured approver users
    #[serde(default)]
    pub users: BTreeSet<UserId>,

    /// Explicitly configured approver groups
    #[serde(default)]
    pub groups: Vec<ApproverGroup>,

    #[serde(default)]
    pub policy: Option<PolicyConfig>,

    #[serde(default)]
    pub source: RuleSource,

    /// Whether the rule still applies once the merge request is merged;
    /// unset behaves as applicable
    #[serde(default)]
    pub applicable_post_merge: Option<bool>,

    /// Approvers materialised when the merge request was merged
    #[serde(default)]
    pub approved_approvers: BTreeSet<UserId>,
}

impl Rule {
    pub fn new(id: u64, name: impl Into<String>, kind: RuleKind, approvals_required: i32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            approvals_required,
            users: BTreeSet::new(),
            groups: Vec::new(),
            policy: None,
            source: RuleSource::default(),
            applicable_post_merge: None,
            approved_approvers: BTreeSet::new(),
        }
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.users.extend(users);
        self
    }

    pub fn with_group(mut self, group: ApproverGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_source(mut self, source: RuleSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_applicable_post_merge(mut self, applicable: Option<bool>) -> Self {
        self.applicable_post_merge = applicable;
        self
    }

    pub fn report_type(&self) -> Option<ReportType> {
        match &self.kind {
            RuleKind::Regular { code_coverage } => {
                code_coverage.then_some(ReportType::CodeCoverage)
            }
            RuleKind::AnyApprover => Some(ReportType::AnyApprover),
            RuleKind::CodeOwner { .. } => Some(ReportType::CodeOwner),
            RuleKind::ScanResultPolicy { report_type, .. } => Some((*report_type).into()),
        }
    }

    pub fn is_any_approver(&self) -> bool {
        matches!(self.kind, RuleKind::AnyApprover)
    }

    pub fn is_code_owner(&self) -> bool {
        matches!(self.kind, RuleKind::CodeOwner { .. })
    }

    /// Regular and any-approver rules; these are subject to the
    /// multiple-approval-rules licence
    pub fn is_user_defined(&self) -> bool {
        matches!(
            self.kind,
            RuleKind::Regular {
                code_coverage: false
            } | RuleKind::AnyApprover
        )
    }

    pub fn from_scan_result_policy(&self) -> bool {
        matches!(self.kind, RuleKind::ScanResultPolicy { .. })
    }

    pub fn code_owner_section(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::CodeOwner { section } => Some(section.as_str()),
            _ => None,
        }
    }

    /// `(orchestration_policy_idx, action_idx)` for scan result policy rules
    pub fn policy_action(&self) -> Option<(Option<u32>, Option<u32>)> {
        match &self.kind {
            RuleKind::ScanResultPolicy {
                orchestration_policy_idx,
                action_idx,
                ..
            } => Some((*orchestration_policy_idx, *action_idx)),
            _ => None,
        }
    }

    /// Stored requirement with negative values clamped to 0
    pub fn required(&self) -> u32 {
        self.approvals_required.max(0).unsigned_abs()
    }

    /// Distinct explicit users and group members
    pub fn configured_approvers(&self) -> BTreeSet<UserId> {
        let mut approvers = self.users.clone();
        for group in &self.groups {
            approvers.extend(group.members.iter().copied());
        }
        approvers
    }

    pub fn has_explicit_approvers(&self) -> bool {
        !self.users.is_empty() || !self.groups.is_empty()
    }

    /// Stored name without the ` <n>` suffix added to de-duplicate names
    /// of rules generated from the same policy
    pub fn policy_name(&self) -> &str {
        let trimmed = self.name.trim_end_matches(|c: char| c.is_ascii_digit());
        if trimmed.len() == self.name.len() {
            return &self.name;
        }
        match trimmed.strip_suffix(|c: char| c.is_whitespace()) {
            Some(base) => base,
            None => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_derived_from_kind() {
        let owner = Rule::new(1, "Owners", RuleKind::code_owner("backend"), 1);
        assert_eq!(owner.report_type(), Some(ReportType::CodeOwner));

        let any = Rule::new(2, "All Members", RuleKind::AnyApprover, 1);
        assert_eq!(any.report_type(), Some(ReportType::AnyApprover));

        let plain = Rule::new(3, "QA", RuleKind::regular(), 1);
        assert_eq!(plain.report_type(), None);

        let coverage = Rule::new(4, "Coverage-Check", RuleKind::Regular { code_coverage: true }, 1);
        assert_eq!(coverage.report_type(), Some(ReportType::CodeCoverage));
    }

    #[test]
    fn test_from_scan_result_policy_covers_all_policy_report_types() {
        for report_type in [
            PolicyReportType::ScanFinding,
            PolicyReportType::LicenseScanning,
            PolicyReportType::AnyMergeRequest,
        ] {
            let rule = Rule::new(1, "Policy", RuleKind::scan_result_policy(report_type, 0, 0), 1);
            assert!(rule.from_scan_result_policy(), "{report_type:?}");
        }

        let coverage = Rule::new(2, "Coverage", RuleKind::Regular { code_coverage: true }, 1);
        assert!(!coverage.from_scan_result_policy());
    }

    #[test]
    fn test_negative_requirement_clamped() {
        let rule = Rule::new(1, "QA", RuleKind::regular(), -4);
        assert_eq!(rule.required(), 0);
    }

    #[test]
    fn test_configured_approvers_union_of_users_and_groups() {
        let rule = Rule::new(1, "QA", RuleKind::regular(), 2)
            .with_users([UserId::new(1), UserId::new(2)])
            .with_group(ApproverGroup::new(10, [UserId::new(2), UserId::new(3)]));

        let approvers: Vec<u64> = rule.configured_approvers().iter().map(|u| u.get()).collect();
        assert_eq!(approvers, vec![1, 2, 3]);
    }

    #[test]
    fn test_policy_name_trims_numeric_suffix() {
        let kind = RuleKind::scan_result_policy(PolicyReportType::ScanFinding, 0, 0);
        assert_eq!(Rule::new(1, "Deny critical 2", kind.clone(), 1).policy_name(), "Deny critical");
        assert_eq!(Rule::new(1, "Deny critical", kind.clone(), 1).policy_name(), "Deny critical");
        assert_eq!(Rule::new(1, "Policy42", kind.clone(), 1).policy_name(), "Policy42");
        assert_eq!(Rule::new(1, "12", kind, 1).policy_name(), "12");
    }

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let rule = Rule::new(7, "Owners", RuleKind::code_owner("docs"), 2);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"]["type"], "code_owner");
        assert_eq!(json["kind"]["section"], "docs");

        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_minimal_rule_json_defaults() {
        let rule: Rule = serde_json::from_str(
            r#"{"id": 1, "name": "QA", "kind": {"type": "regular"}, "approvals_required": 1}"#,
        )
        .unwrap();
        assert_eq!(rule.source, RuleSource::MergeRequest);
        assert!(rule.users.is_empty());
        assert!(rule.policy.is_none());
        assert_eq!(rule.applicable_post_merge, None);
    }
}

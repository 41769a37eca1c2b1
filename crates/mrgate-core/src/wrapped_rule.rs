//! Per-rule evaluation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::approvers::{ApproverSet, ApproverSetResolver};
use crate::code_owner;
use crate::context::EvaluationContext;
use crate::failure_mode;
use crate::model::{Rule, RuleKind, UserId};
use crate::requirement::{RequiredApprovalCountEngine, RequirementInput};

/// Outcome of evaluating one rule against one merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub rule_id: u64,
    pub approved_approvers: BTreeSet<UserId>,
    pub unactioned_approvers: BTreeSet<UserId>,
    pub commented_approvers: BTreeSet<UserId>,
    /// Effective requirement
    pub approvals_required: u32,
    pub approvals_left: u32,
    pub approved: bool,
    pub invalid_rule: bool,
    pub fail_open: bool,
    pub allow_merge_when_invalid: bool,
}

/// A rule bound to the merge request it is evaluated against
#[derive(Debug, Clone)]
pub struct WrappedRule<'a> {
    rule: &'a Rule,
    approvers: ApproverSet,
    result: EvaluationResult,
}

impl<'a> WrappedRule<'a> {
    pub fn new(rule: &'a Rule, ctx: &EvaluationContext<'_>) -> Self {
        let approvers = ApproverSetResolver.resolve(rule, ctx);

        let approvals_required = match &rule.kind {
            RuleKind::CodeOwner { .. } => code_owner::effective_approvals_required(rule, ctx),
            RuleKind::Regular { .. }
            | RuleKind::AnyApprover
            | RuleKind::ScanResultPolicy { .. } => rule.required(),
        };

        let fail_open = failure_mode::fail_open(rule, &ctx.features);
        let allow_merge_when_invalid =
            failure_mode::allow_merge_when_invalid(rule, ctx.merge_request, &ctx.features);

        let outcome = RequiredApprovalCountEngine.evaluate(RequirementInput {
            approvals_required,
            approved_count: approvers.approved.len(),
            has_unactioned: !approvers.unactioned.is_empty(),
            any_approver: rule.is_any_approver(),
            allow_merge_when_invalid,
        });

        tracing::debug!(
            rule_id = rule.id,
            kind = rule.kind.tag(),
            approvals_required,
            approvals_left = outcome.approvals_left,
            approved = outcome.approved,
            invalid_rule = outcome.invalid_rule,
            "evaluated rule"
        );

        let result = EvaluationResult {
            rule_id: rule.id,
            approved_approvers: approvers.approved.clone(),
            unactioned_approvers: approvers.unactioned.clone(),
            commented_approvers: approvers.commented.clone(),
            approvals_required,
            approvals_left: outcome.approvals_left,
            approved: outcome.approved,
            invalid_rule: outcome.invalid_rule,
            fail_open,
            allow_merge_when_invalid,
        };

        Self {
            rule,
            approvers,
            result,
        }
    }

    pub fn rule(&self) -> &'a Rule {
        self.rule
    }

    pub fn approvers(&self) -> &ApproverSet {
        &self.approvers
    }

    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }

    pub fn into_result(self) -> EvaluationResult {
        self.result
    }

    pub fn approved(&self) -> bool {
        self.result.approved
    }

    pub fn invalid_rule(&self) -> bool {
        self.result.invalid_rule
    }

    pub fn approvals_required(&self) -> u32 {
        self.result.approvals_required
    }

    pub fn approvals_left(&self) -> u32 {
        self.result.approvals_left
    }
}

/// Evaluate a single rule
///
/// # Example
/// ```
/// use mrgate_core::context::EvaluationContext;
/// use mrgate_core::model::{Approval, MergeRequestSnapshot, ProjectSettings, Rule, RuleKind, UserId};
/// use mrgate_core::policy::StaticBranchProtection;
/// use mrgate_core::wrapped_rule::evaluate;
///
/// let rule = Rule::new(1, "QA", RuleKind::regular(), 1)
///     .with_users([UserId::new(2), UserId::new(3)]);
/// let mr = MergeRequestSnapshot::new(1, UserId::new(1), "main", ProjectSettings::new(1));
/// let approvals = vec![Approval::new(UserId::new(2))];
/// let protection = StaticBranchProtection::unprotected();
///
/// let result = evaluate(&rule, &EvaluationContext::new(&mr, &approvals, &protection));
/// assert!(result.approved);
/// assert_eq!(result.approvals_left, 0);
/// ```
pub fn evaluate(rule: &Rule, ctx: &EvaluationContext<'_>) -> EvaluationResult {
    WrappedRule::new(rule, ctx).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LicensedFeatures;
    use crate::model::{
        Approval, MergeRequestSnapshot, PolicyConfig, PolicyReportType, ProjectSettings,
    };
    use crate::policy::StaticBranchProtection;

    fn mr() -> MergeRequestSnapshot {
        MergeRequestSnapshot::new(1, UserId::new(100), "main", ProjectSettings::new(1))
    }

    fn approvals(ids: &[u64]) -> Vec<Approval> {
        ids.iter().map(|id| Approval::new(UserId::new(*id))).collect()
    }

    #[test]
    fn test_invalid_rule_fail_closed_then_open() {
        let rule = Rule::new(1, "QA", RuleKind::regular(), 8)
            .with_users([UserId::new(1), UserId::new(2)]);
        let mr = mr();
        let approvals = approvals(&[1, 2]);
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &approvals, &protection);

        let closed = evaluate(&rule, &ctx);
        assert!(closed.invalid_rule);
        assert!(!closed.approved);
        assert_eq!(closed.approvals_left, 6);
        assert!(!closed.fail_open);

        let open_rule = rule.with_policy(PolicyConfig::fail_open());
        let open = evaluate(&open_rule, &ctx);
        assert!(open.invalid_rule);
        assert!(open.approved);
        assert_eq!(open.approvals_left, 0);
        assert!(open.fail_open);
        assert!(open.allow_merge_when_invalid);
    }

    #[test]
    fn test_fail_open_without_licence_blocks() {
        let rule = Rule::new(
            1,
            "Scan",
            RuleKind::scan_result_policy(PolicyReportType::ScanFinding, 0, 0),
            2,
        )
        .with_policy(PolicyConfig::fail_open());
        let mr = mr();
        let protection = StaticBranchProtection::unprotected();
        let features = LicensedFeatures {
            fail_open_policy_enabled: false,
            ..LicensedFeatures::default()
        };
        let ctx = EvaluationContext::new(&mr, &[], &protection).with_features(features);

        let result = evaluate(&rule, &ctx);
        assert!(result.invalid_rule);
        assert!(!result.approved);
        assert_eq!(result.approvals_left, 2);
    }

    #[test]
    fn test_code_owner_rule_uses_effective_requirement() {
        let rule = Rule::new(1, "Owners", RuleKind::code_owner("backend"), 5)
            .with_users([UserId::new(1)]);
        let mr = mr();
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        let result = evaluate(&rule, &ctx);
        assert_eq!(result.approvals_required, 0);
        assert!(result.approved);
        assert!(!result.invalid_rule);
    }

    #[test]
    fn test_commented_approvers_reported() {
        let rule = Rule::new(1, "QA", RuleKind::regular(), 1)
            .with_users([UserId::new(1), UserId::new(2)]);
        let mr = mr();
        let comments = vec![crate::model::Comment::by(UserId::new(2))];
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection).with_comments(&comments);

        let result = evaluate(&rule, &ctx);
        assert_eq!(result.commented_approvers.len(), 1);
        assert_eq!(result.unactioned_approvers.len(), 2);
    }
}

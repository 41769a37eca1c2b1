/// Scenario 1: Invalid rules and failure mode
///
/// A rule whose approver pool is exhausted before its requirement is met
/// blocks the merge request unless its policy fails open.
mod common;

use common::{approvals, merged_mr, open_mr, regular_rule};
use mrgate_core::context::EvaluationContext;
use mrgate_core::features::LicensedFeatures;
use mrgate_core::model::{PolicyConfig, PolicyReportType, Rule, RuleKind};
use mrgate_core::policy::StaticBranchProtection;
use mrgate_core::wrapped_rule::evaluate;

fn scan_finding_rule(required: i32, approvers: &[u64]) -> Rule {
    Rule::new(
        10,
        "Deny critical",
        RuleKind::scan_result_policy(PolicyReportType::ScanFinding, 0, 0),
        required,
    )
    .with_users(common::users(approvers))
}

#[test]
fn test_scenario_01_happy_exhausted_pool_fail_closed_then_open() {
    // GIVEN a rule requiring 8 approvals from two named approvers who both approved
    let mr = open_mr();
    let approvals = approvals(&[1, 2]);
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);
    let rule = regular_rule(1, 8, &[1, 2]);

    // WHEN evaluating without a policy
    let result = evaluate(&rule, &ctx);

    // THEN the rule is invalid and blocks with the computed remainder
    assert!(result.invalid_rule);
    assert!(!result.approved);
    assert_eq!(result.approvals_left, 6);

    // AND attaching a fail-open policy lets it through
    let result = evaluate(&rule.with_policy(PolicyConfig::fail_open()), &ctx);
    assert!(result.invalid_rule);
    assert!(result.approved);
    assert_eq!(result.approvals_left, 0);
}

#[test]
fn test_scenario_01_happy_fail_closed_policy_keeps_remainder() {
    // GIVEN a scan finding rule requiring 3 with two approvers who both approved
    let mr = open_mr();
    let approvals = approvals(&[1, 2]);
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);
    let rule = scan_finding_rule(3, &[1, 2]).with_policy(PolicyConfig::fail_closed());

    // WHEN evaluating
    let result = evaluate(&rule, &ctx);

    // THEN it stays blocked with one approval left
    assert!(result.invalid_rule);
    assert!(!result.approved);
    assert_eq!(result.approvals_left, 1);
    assert!(!result.fail_open);
}

#[test]
fn test_scenario_01_happy_policy_management_project_allows_merge() {
    // GIVEN a scan finding rule with no approvers on a policy management project
    let mut mr = open_mr();
    mr.project.security_policy_management_project = true;
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &[], &protection);

    // WHEN evaluating
    let result = evaluate(&scan_finding_rule(2, &[]), &ctx);

    // THEN the invalid rule does not block
    assert!(result.invalid_rule);
    assert!(result.allow_merge_when_invalid);
    assert!(!result.fail_open);
    assert!(result.approved);
    assert_eq!(result.approvals_left, 0);
}

#[test]
fn test_scenario_01_error_fail_open_disabled_by_licence() {
    // GIVEN a fail-open rule but the fail-open licence switched off
    let mr = open_mr();
    let protection = StaticBranchProtection::unprotected();
    let features = LicensedFeatures {
        fail_open_policy_enabled: false,
        ..LicensedFeatures::default()
    };
    let ctx = EvaluationContext::new(&mr, &[], &protection).with_features(features);
    let rule = scan_finding_rule(1, &[]).with_policy(PolicyConfig::fail_open());

    // WHEN evaluating
    let result = evaluate(&rule, &ctx);

    // THEN the rule fails closed
    assert!(!result.fail_open);
    assert!(!result.approved);
    assert_eq!(result.approvals_left, 1);
}

#[test]
fn test_scenario_01_happy_valid_rule_ignores_policy() {
    // GIVEN a fail-open rule with an approver still to act
    let mr = open_mr();
    let approvals = approvals(&[1]);
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);
    let rule = regular_rule(1, 2, &[1, 2]).with_policy(PolicyConfig::fail_open());

    // WHEN evaluating
    let result = evaluate(&rule, &ctx);

    // THEN the policy has no effect
    assert!(!result.invalid_rule);
    assert!(!result.approved);
    assert_eq!(result.approvals_left, 1);
}

#[test]
fn test_scenario_01_happy_blocked_user_exhausts_pool() {
    // GIVEN a rule whose only unactioned approver is blocked
    let mr = open_mr().with_blocked_users(common::users(&[2]));
    let approvals = approvals(&[1]);
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);

    // WHEN evaluating
    let result = evaluate(&regular_rule(1, 2, &[1, 2]), &ctx);

    // THEN the rule is invalid
    assert!(result.invalid_rule);
    assert!(result.unactioned_approvers.is_empty());
    assert!(!result.approved);
}

#[test]
fn test_scenario_01_happy_merged_rule_reports_materialised_approvers() {
    // GIVEN a merged merge request whose rule stored its approvers at merge
    let mr = merged_mr();
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &[], &protection);
    let mut rule = regular_rule(1, 1, &[1, 2]);
    rule.approved_approvers = common::users(&[2]).into_iter().collect();

    // WHEN evaluating with no live approvals
    let result = evaluate(&rule, &ctx);

    // THEN the stored approvers satisfy the rule
    assert!(result.approved);
    assert_eq!(result.approved_approvers.len(), 1);
}

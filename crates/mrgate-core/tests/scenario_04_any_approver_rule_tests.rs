/// Scenario 4: Any-approver rules
///
/// Every eligible approving user counts; the rule is never invalid.
mod common;

use common::{any_approver_rule, approvals, open_mr, AUTHOR};
use mrgate_core::context::EvaluationContext;
use mrgate_core::model::{Approval, UserId};
use mrgate_core::policy::StaticBranchProtection;
use mrgate_core::wrapped_rule::evaluate;

#[test]
fn test_scenario_04_happy_any_users_satisfy_rule() {
    // GIVEN an any-approver rule requiring 2
    let mr = open_mr();
    let approvals = approvals(&[11, 12]);
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);

    // WHEN two unrelated users approved
    let result = evaluate(&any_approver_rule(1, 2), &ctx);

    // THEN the rule is approved
    assert!(result.approved);
    assert_eq!(result.approved_approvers.len(), 2);
}

#[test]
fn test_scenario_04_happy_never_invalid_without_approvals() {
    // GIVEN an any-approver rule and no approvals
    let mr = open_mr();
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &[], &protection);

    // WHEN evaluating
    let result = evaluate(&any_approver_rule(1, 2), &ctx);

    // THEN it is pending, not invalid
    assert!(!result.invalid_rule);
    assert!(!result.approved);
    assert_eq!(result.approvals_left, 2);
}

#[test]
fn test_scenario_04_happy_author_and_committer_excluded() {
    // GIVEN the author and a committer approved where neither may approve
    let mut mr = open_mr().with_committers([UserId::new(5)]);
    mr.project.committers_approval_disabled = true;
    let approvals = vec![Approval::new(AUTHOR), Approval::new(UserId::new(5))];
    let protection = StaticBranchProtection::unprotected();
    let ctx = EvaluationContext::new(&mr, &approvals, &protection);

    // WHEN evaluating
    let result = evaluate(&any_approver_rule(1, 1), &ctx);

    // THEN neither counts
    assert!(result.approved_approvers.is_empty());
    assert!(!result.approved);
    assert!(!result.invalid_rule);
}

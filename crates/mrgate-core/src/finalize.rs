//! Write-back operations run when a merge request is merged
//!
//! These are the only operations that modify a [`Rule`]. The caller decides
//! when to run them and persists the updated definition.

use crate::approvers::ApproverSetResolver;
use crate::code_owner;
use crate::context::EvaluationContext;
use crate::errors::{MrgateError, Result};
use crate::model::Rule;

/// Freeze the requirement of a code owner rule on a merged merge request
///
/// When the rule was not required at merge time its stored requirement is
/// set to 0 so later evaluations of the merged merge request agree with what
/// was enforced. Returns whether the rule changed.
///
/// # Errors
///
/// Returns [`MrgateError::MergeRequestNotMerged`] when the merge request is
/// still open and [`MrgateError::NotCodeOwnerRule`] for any other rule kind.
pub fn finalize(rule: &mut Rule, ctx: &EvaluationContext<'_>) -> Result<bool> {
    if !ctx.merge_request.is_merged() {
        return Err(MrgateError::MergeRequestNotMerged {
            merge_request_id: ctx.merge_request.id,
        });
    }
    if !rule.is_code_owner() {
        return Err(MrgateError::NotCodeOwnerRule { rule_id: rule.id });
    }

    if code_owner::live_approvals_required(rule, ctx) == 0 && rule.approvals_required != 0 {
        tracing::debug!(rule_id = rule.id, "code owner rule not required at merge");
        rule.approvals_required = 0;
        return Ok(true);
    }
    Ok(false)
}

/// Materialise the approvers of `rule` at merge time
///
/// No-op unless the merge request is merged and `finalizing` is set.
/// Any-approver rules record every approving user. Returns whether the
/// stored set changed.
pub fn sync_approved_approvers(
    rule: &mut Rule,
    ctx: &EvaluationContext<'_>,
    finalizing: bool,
) -> bool {
    if !finalizing || !ctx.merge_request.is_merged() {
        return false;
    }

    let approved = if rule.is_any_approver() {
        ctx.approving_users()
    } else {
        ApproverSetResolver.resolve_live(rule, ctx).approved
    };

    if approved == rule.approved_approvers {
        return false;
    }
    tracing::debug!(
        rule_id = rule.id,
        approved = approved.len(),
        "synced approved approvers"
    );
    rule.approved_approvers = approved;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Approval, MergeRequestSnapshot, MergeRequestState, ProjectSettings, RuleKind, UserId,
    };
    use crate::policy::StaticBranchProtection;

    fn merged() -> MergeRequestSnapshot {
        MergeRequestSnapshot::new(1, UserId::new(100), "main", ProjectSettings::new(1))
            .with_state(MergeRequestState::Merged)
    }

    #[test]
    fn test_finalize_rejects_open_merge_request() {
        let mut rule = Rule::new(1, "Owners", RuleKind::code_owner("backend"), 2);
        let mr = MergeRequestSnapshot::new(1, UserId::new(100), "main", ProjectSettings::new(1));
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(
            finalize(&mut rule, &ctx),
            Err(MrgateError::MergeRequestNotMerged {
                merge_request_id: 1
            })
        );
    }

    #[test]
    fn test_finalize_rejects_non_code_owner_rule() {
        let mut rule = Rule::new(4, "QA", RuleKind::regular(), 2);
        let mr = merged();
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(
            finalize(&mut rule, &ctx),
            Err(MrgateError::NotCodeOwnerRule { rule_id: 4 })
        );
    }

    #[test]
    fn test_finalize_zeroes_unrequired_rule() {
        let mut rule = Rule::new(1, "Owners", RuleKind::code_owner("backend"), 2)
            .with_users([UserId::new(1), UserId::new(2)]);
        let mr = merged();
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(finalize(&mut rule, &ctx), Ok(true));
        assert_eq!(rule.approvals_required, 0);
        assert_eq!(finalize(&mut rule, &ctx), Ok(false));
    }

    #[test]
    fn test_finalize_keeps_required_rule() {
        let mut rule = Rule::new(1, "Owners", RuleKind::code_owner("backend"), 2)
            .with_users([UserId::new(1), UserId::new(2)]);
        let mr = merged();
        let protection = StaticBranchProtection::requiring_code_owners();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(finalize(&mut rule, &ctx), Ok(false));
        assert_eq!(rule.approvals_required, 2);
    }

    #[test]
    fn test_sync_requires_merged_and_finalizing() {
        let mut rule = Rule::new(1, "QA", RuleKind::regular(), 1).with_users([UserId::new(1)]);
        let approvals = vec![Approval::new(UserId::new(1))];
        let protection = StaticBranchProtection::unprotected();

        let open = MergeRequestSnapshot::new(1, UserId::new(100), "main", ProjectSettings::new(1));
        let ctx = EvaluationContext::new(&open, &approvals, &protection);
        assert!(!sync_approved_approvers(&mut rule, &ctx, true));

        let mr = merged();
        let ctx = EvaluationContext::new(&mr, &approvals, &protection);
        assert!(!sync_approved_approvers(&mut rule, &ctx, false));
        assert!(rule.approved_approvers.is_empty());

        assert!(sync_approved_approvers(&mut rule, &ctx, true));
        assert_eq!(rule.approved_approvers.len(), 1);
    }

    #[test]
    fn test_sync_any_approver_stores_every_approver() {
        let mut rule = Rule::new(1, "All Members", RuleKind::AnyApprover, 1);
        let mr = merged();
        let approvals = vec![Approval::new(UserId::new(100)), Approval::new(UserId::new(3))];
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &approvals, &protection);

        assert!(sync_approved_approvers(&mut rule, &ctx, true));
        assert_eq!(rule.approved_approvers.len(), 2);
    }
}

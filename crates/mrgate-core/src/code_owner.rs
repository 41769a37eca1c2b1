//! Effective requirement of code owner rules

use crate::context::EvaluationContext;
use crate::model::Rule;

/// Requirement used when evaluating a code owner rule
///
/// Merged merge requests keep the stored requirement so that later changes
/// to branch protection cannot rewrite history.
pub fn effective_approvals_required(rule: &Rule, ctx: &EvaluationContext<'_>) -> u32 {
    if ctx.merge_request.is_merged() {
        return rule.required();
    }
    live_approvals_required(rule, ctx)
}

/// Requirement derived from the current licence and branch protection
///
/// Returns 0 when code owner approval is unavailable, the rule's section is
/// optional for the target branch, or the branch does not require code owner
/// approval. Otherwise the stored requirement, capped by the number of
/// configured approvers.
pub fn live_approvals_required(rule: &Rule, ctx: &EvaluationContext<'_>) -> u32 {
    let mr = ctx.merge_request;

    if !ctx.features.code_owner_approval_required_available {
        return 0;
    }

    if let Some(section) = rule.code_owner_section() {
        if ctx
            .branch_protection
            .optional_section(mr.project.id, &mr.target_branch, section)
        {
            return 0;
        }
    }

    if !ctx
        .branch_protection
        .branch_requires_code_owner_approval(mr.project.id, &mr.target_branch)
    {
        return 0;
    }

    let configured = u32::try_from(rule.configured_approvers().len()).unwrap_or(u32::MAX);
    rule.required().min(configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LicensedFeatures;
    use crate::model::{MergeRequestSnapshot, MergeRequestState, ProjectSettings, RuleKind, UserId};
    use crate::policy::StaticBranchProtection;

    fn owners_rule(required: i32) -> Rule {
        Rule::new(1, "Owners", RuleKind::code_owner("backend"), required)
            .with_users([UserId::new(1), UserId::new(2)])
    }

    fn mr() -> MergeRequestSnapshot {
        MergeRequestSnapshot::new(1, UserId::new(9), "main", ProjectSettings::new(1))
    }

    #[test]
    fn test_capped_by_configured_approvers() {
        let mr = mr();
        let protection = StaticBranchProtection::requiring_code_owners();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(effective_approvals_required(&owners_rule(5), &ctx), 2);
        assert_eq!(effective_approvals_required(&owners_rule(1), &ctx), 1);
    }

    #[test]
    fn test_zero_without_licence() {
        let mr = mr();
        let protection = StaticBranchProtection::requiring_code_owners();
        let features = LicensedFeatures {
            code_owner_approval_required_available: false,
            ..LicensedFeatures::default()
        };
        let ctx = EvaluationContext::new(&mr, &[], &protection).with_features(features);

        assert_eq!(effective_approvals_required(&owners_rule(2), &ctx), 0);
    }

    #[test]
    fn test_zero_for_optional_section() {
        let mr = mr();
        let protection =
            StaticBranchProtection::requiring_code_owners().with_optional_section("backend");
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(effective_approvals_required(&owners_rule(2), &ctx), 0);
    }

    #[test]
    fn test_zero_when_branch_does_not_require_code_owners() {
        let mr = mr();
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(effective_approvals_required(&owners_rule(5), &ctx), 0);
    }

    #[test]
    fn test_merged_keeps_stored_requirement() {
        let mr = mr().with_state(MergeRequestState::Merged);
        let protection = StaticBranchProtection::unprotected();
        let ctx = EvaluationContext::new(&mr, &[], &protection);

        assert_eq!(effective_approvals_required(&owners_rule(5), &ctx), 5);
        assert_eq!(live_approvals_required(&owners_rule(5), &ctx), 0);
    }
}

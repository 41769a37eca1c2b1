//! Eligibility for rules any user may satisfy

use std::collections::BTreeSet;

use crate::context::EvaluationContext;
use crate::model::UserId;

/// Approving users who count toward an any-approver rule
///
/// Authors and committers are dropped when the project or a policy forbids
/// them from approving, as are blocked users. An any-approver rule can
/// always be satisfied by new approvals, so it is never invalid.
pub fn eligible_approvers(ctx: &EvaluationContext<'_>) -> BTreeSet<UserId> {
    let mr = ctx.merge_request;
    ctx.approving_users()
        .into_iter()
        .filter(|user| !mr.blocked_users.contains(user))
        .filter(|user| !mr.excluded_as_author_or_committer(*user))
        .collect()
}

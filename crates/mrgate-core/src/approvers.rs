//! Approver set resolution for a single rule

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::any_approver;
use crate::context::EvaluationContext;
use crate::model::{Rule, RuleSource, UserId};

/// The user sets of one rule against one merge request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverSet {
    /// Users whose approval counts toward the rule
    pub eligible: BTreeSet<UserId>,
    /// Eligible users who approved
    pub approved: BTreeSet<UserId>,
    /// Eligible users who have not approved
    pub unactioned: BTreeSet<UserId>,
    /// Eligible users who commented without approving
    pub commented: BTreeSet<UserId>,
}

/// Computes [`ApproverSet`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproverSetResolver;

impl ApproverSetResolver {
    /// Resolve the approver sets of `rule`
    ///
    /// On a merged merge request a merge request rule reports its
    /// materialised approvers, when it has any, instead of recomputing them.
    pub fn resolve(&self, rule: &Rule, ctx: &EvaluationContext<'_>) -> ApproverSet {
        let mut set = self.resolve_live(rule, ctx);

        if ctx.merge_request.is_merged()
            && rule.source == RuleSource::MergeRequest
            && !rule.approved_approvers.is_empty()
        {
            set.approved = rule.approved_approvers.clone();
            set.unactioned = set.eligible.difference(&set.approved).copied().collect();
            set.commented.retain(|user| !set.approved.contains(user));
        }

        set
    }

    /// Resolve from the approval records only, ignoring materialised approvers
    pub fn resolve_live(&self, rule: &Rule, ctx: &EvaluationContext<'_>) -> ApproverSet {
        let eligible = self.eligible(rule, ctx);
        let approving = ctx.approving_users();

        let approved: BTreeSet<UserId> = eligible.intersection(&approving).copied().collect();
        let unactioned: BTreeSet<UserId> = eligible.difference(&approved).copied().collect();
        let commented: BTreeSet<UserId> = ctx
            .commenting_users()
            .intersection(&eligible)
            .filter(|user| !approved.contains(user))
            .copied()
            .collect();

        tracing::debug!(
            rule_id = rule.id,
            eligible = eligible.len(),
            approved = approved.len(),
            unactioned = unactioned.len(),
            "resolved approver set"
        );

        ApproverSet {
            eligible,
            approved,
            unactioned,
            commented,
        }
    }

    fn eligible(&self, rule: &Rule, ctx: &EvaluationContext<'_>) -> BTreeSet<UserId> {
        if rule.is_any_approver() {
            return any_approver::eligible_approvers(ctx);
        }

        let mr = ctx.merge_request;
        rule.configured_approvers()
            .into_iter()
            .filter(|user| !mr.blocked_users.contains(user))
            .filter(|user| !mr.excluded_as_author_or_committer(*user))
            .collect()
    }
}

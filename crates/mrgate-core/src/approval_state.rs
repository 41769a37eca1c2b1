//! Aggregate approval state of one merge request
//!
//! Rule selection happens once, when the state is built:
//!
//! 1. Nothing is evaluated when the approval feature is unavailable.
//! 2. Scan result policy rules generated for the same policy action are
//!    collapsed to the first definition.
//! 3. Without the multiple-approval-rules licence only the first user-defined
//!    rule is kept.
//! 4. A merged merge request keeps only post-merge applicable rules that were
//!    approved and valid.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::context::EvaluationContext;
use crate::model::{Rule, UserId};
use crate::policy::ApproverAccess;
use crate::wrapped_rule::{EvaluationResult, WrappedRule};

pub struct ApprovalState<'a> {
    ctx: EvaluationContext<'a>,
    rules: Vec<WrappedRule<'a>>,
}

impl<'a> ApprovalState<'a> {
    pub fn new(rules: &'a [Rule], ctx: EvaluationContext<'a>) -> Self {
        if !ctx.features.approval_feature_available {
            tracing::debug!(
                merge_request_id = ctx.merge_request.id,
                "approval feature unavailable, skipping rules"
            );
            return Self {
                ctx,
                rules: Vec::new(),
            };
        }

        let mut seen_policy_actions = HashSet::new();
        let mut user_defined_kept = false;
        let mut wrapped = Vec::new();

        for rule in rules {
            if let Some((Some(policy_idx), action_idx)) = rule.policy_action() {
                if !seen_policy_actions.insert((policy_idx, action_idx)) {
                    continue;
                }
            }

            if rule.is_user_defined() && !ctx.features.multiple_approval_rules {
                if user_defined_kept {
                    continue;
                }
                user_defined_kept = true;
            }

            if ctx.merge_request.is_merged() && rule.applicable_post_merge == Some(false) {
                continue;
            }

            let rule = WrappedRule::new(rule, &ctx);
            if ctx.merge_request.is_merged() && (!rule.approved() || rule.invalid_rule()) {
                continue;
            }
            wrapped.push(rule);
        }

        tracing::debug!(
            merge_request_id = ctx.merge_request.id,
            defined = rules.len(),
            kept = wrapped.len(),
            "built approval state"
        );

        Self {
            ctx,
            rules: wrapped,
        }
    }

    pub fn wrapped_rules(&self) -> &[WrappedRule<'a>] {
        &self.rules
    }

    pub fn approval_feature_available(&self) -> bool {
        self.ctx.features.approval_feature_available
    }

    /// Any-approver requirement or the sum of all other requirements,
    /// whichever is larger
    pub fn approvals_required(&self) -> u32 {
        self.aggregate(WrappedRule::approvals_required)
    }

    pub fn approvals_left(&self) -> u32 {
        self.aggregate(WrappedRule::approvals_left)
    }

    fn aggregate(&self, value: fn(&WrappedRule<'a>) -> u32) -> u32 {
        let (any_approver, others): (Vec<_>, Vec<_>) =
            self.rules.iter().partition(|r| r.rule().is_any_approver());

        let any_approver = any_approver.into_iter().map(value).max().unwrap_or(0);
        let others = others.into_iter().map(value).fold(0u32, u32::saturating_add);
        any_approver.max(others)
    }

    pub fn approved(&self) -> bool {
        if !self.approval_feature_available() {
            return true;
        }
        !self.temporarily_unapproved() && self.rules.iter().all(WrappedRule::approved)
    }

    pub fn approval_needed(&self) -> bool {
        self.approval_feature_available() && self.approvals_required() > 0
    }

    pub fn approval_rules_left(&self) -> Vec<&WrappedRule<'a>> {
        self.rules.iter().filter(|r| !r.approved()).collect()
    }

    pub fn invalid_approvers_rules(&self) -> Vec<&WrappedRule<'a>> {
        self.rules.iter().filter(|r| r.invalid_rule()).collect()
    }

    /// Eligible approvers of every rule except any-approver rules
    pub fn approvers(&self) -> BTreeSet<UserId> {
        self.filtered_approvers(true, false)
    }

    /// Eligible approvers who have not approved yet
    pub fn unactioned_approvers(&self) -> BTreeSet<UserId> {
        self.filtered_approvers(true, true)
    }

    pub fn filtered_approvers(
        &self,
        include_code_owners: bool,
        unactioned_only: bool,
    ) -> BTreeSet<UserId> {
        let mut users: BTreeSet<UserId> = self
            .rules
            .iter()
            .filter(|r| !r.rule().is_any_approver())
            .filter(|r| include_code_owners || !r.rule().is_code_owner())
            .flat_map(|r| {
                if unactioned_only {
                    r.approvers().unactioned.iter().copied()
                } else {
                    r.approvers().eligible.iter().copied()
                }
            })
            .collect();

        if unactioned_only {
            let approving = self.ctx.approving_users();
            users.retain(|user| !approving.contains(user));
        }
        users
    }

    /// Whether `user` may approve the merge request now
    pub fn eligible_for_approval_by(
        &self,
        user: Option<UserId>,
        access: &dyn ApproverAccess,
    ) -> bool {
        let Some(user) = user else {
            return false;
        };
        let mr = self.ctx.merge_request;

        if !access.can_approve(mr.project.id, user) {
            return false;
        }
        if self.ctx.approvals.iter().any(|a| a.user == user) {
            return false;
        }
        if self.unactioned_approvers().contains(&user) {
            return true;
        }
        if user == mr.author && !self.authors_can_approve() {
            return false;
        }
        if mr.committers.contains(&user) && !self.committers_can_approve() {
            return false;
        }
        true
    }

    pub fn authors_can_approve(&self) -> bool {
        self.ctx.merge_request.authors_can_approve()
    }

    pub fn committers_can_approve(&self) -> bool {
        self.ctx.merge_request.committers_can_approve()
    }

    pub fn total_approvals_count(&self) -> usize {
        self.ctx.approvals.len()
    }

    pub fn temporarily_unapproved(&self) -> bool {
        self.ctx.merge_request.temporarily_unapproved
    }

    /// Name shown for a kept rule
    ///
    /// Scan result policy rules show the policy name, suffixed with the
    /// action number when the policy contributes several actions.
    pub fn display_name(&self, rule: &Rule) -> String {
        let Some((Some(policy_idx), action_idx)) = rule.policy_action() else {
            return rule.name.clone();
        };

        let multiple_actions = self.rules.iter().any(|other| {
            matches!(
                other.rule().policy_action(),
                Some((Some(other_policy), other_action))
                    if other_policy == policy_idx && other_action != action_idx
            )
        });

        match action_idx {
            Some(action_idx) if multiple_actions => {
                format!("{} - Action {}", rule.policy_name(), u64::from(action_idx) + 1)
            }
            _ => rule.policy_name().to_string(),
        }
    }

    pub fn summary(&self) -> ApprovalSummary {
        ApprovalSummary {
            merge_request_id: self.ctx.merge_request.id,
            approved: self.approved(),
            approval_needed: self.approval_needed(),
            approvals_required: self.approvals_required(),
            approvals_left: self.approvals_left(),
            total_approvals_count: self.total_approvals_count(),
            rules: self
                .rules
                .iter()
                .map(|r| RuleSummary {
                    name: self.display_name(r.rule()),
                    result: r.result().clone(),
                })
                .collect(),
        }
    }
}

/// Serializable snapshot of an [`ApprovalState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub merge_request_id: u64,
    pub approved: bool,
    pub approval_needed: bool,
    pub approvals_required: u32,
    pub approvals_left: u32,
    pub total_approvals_count: usize,
    pub rules: Vec<RuleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub name: String,
    pub result: EvaluationResult,
}

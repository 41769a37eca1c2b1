//! Required approval counting

use serde::{Deserialize, Serialize};

/// What the counting engine needs to know about one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequirementInput {
    /// Effective requirement after code owner adjustment
    pub approvals_required: u32,
    pub approved_count: usize,
    pub has_unactioned: bool,
    pub any_approver: bool,
    pub allow_merge_when_invalid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementOutcome {
    pub approvals_left: u32,
    pub approved: bool,
    pub invalid_rule: bool,
}

/// Turns approval counts into `approvals_left`, `approved` and `invalid_rule`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredApprovalCountEngine;

impl RequiredApprovalCountEngine {
    /// A rule is invalid when it still needs approvals but nobody left in
    /// its approver pool can give them. Any-approver rules are never
    /// invalid. Only invalid rules consult the fail-open decision.
    pub fn evaluate(&self, input: RequirementInput) -> RequirementOutcome {
        let approved_count = u32::try_from(input.approved_count).unwrap_or(u32::MAX);
        let computed_left = input.approvals_required.saturating_sub(approved_count);

        let invalid_rule = computed_left > 0 && !input.has_unactioned && !input.any_approver;

        if invalid_rule {
            return if input.allow_merge_when_invalid {
                RequirementOutcome {
                    approvals_left: 0,
                    approved: true,
                    invalid_rule,
                }
            } else {
                RequirementOutcome {
                    approvals_left: computed_left.max(1),
                    approved: false,
                    invalid_rule,
                }
            };
        }

        RequirementOutcome {
            approvals_left: computed_left,
            approved: computed_left == 0,
            invalid_rule,
        }
    }
}

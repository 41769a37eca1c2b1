use crate::errors::{MrgateError, Result};
use crate::model::rule::APPROVALS_REQUIRED_MAX;
use crate::model::Rule;

use super::invariants;

type RequirementCheck = fn(&[Rule]) -> Vec<(u64, i32)>;

/// Validate a single rule definition before it is stored
///
/// # Errors
/// Returns the first problem found: the name, then the requirement range,
/// then explicit approvers on an any-approver rule.
pub fn validate_rule(rule: &Rule) -> Result<()> {
    validate_rules_individually(
        std::slice::from_ref(rule),
        invariants::find_out_of_range_requirements,
    )
}

/// Validate every rule of a merge request before they are stored, including
/// cross-rule constraints
///
/// # Errors
/// Returns the first error encountered. For exhaustive error reporting,
/// call the individual invariant functions directly.
pub fn validate_rules(rules: &[Rule]) -> Result<()> {
    validate_rules_individually(rules, invariants::find_out_of_range_requirements)?;
    validate_rule_set(rules)
}

/// Validate a stored rule before evaluating it
///
/// Same checks as [`validate_rule`], except that a negative requirement is
/// accepted and evaluates as 0.
///
/// # Errors
/// Returns the first problem found, in the order of [`validate_rule`].
pub fn validate_rule_for_evaluation(rule: &Rule) -> Result<()> {
    validate_rules_individually(
        std::slice::from_ref(rule),
        invariants::find_excessive_requirements,
    )
}

/// Validate the stored rules of a merge request before evaluating them
///
/// # Errors
/// Returns the first error encountered, in the order of [`validate_rules`].
pub fn validate_rules_for_evaluation(rules: &[Rule]) -> Result<()> {
    validate_rules_individually(rules, invariants::find_excessive_requirements)?;
    validate_rule_set(rules)
}

fn validate_rule_set(rules: &[Rule]) -> Result<()> {
    if let Some((name, first_rule_id, second_rule_id)) =
        invariants::find_duplicate_names(rules).into_iter().next()
    {
        return Err(MrgateError::DuplicateRuleName {
            name,
            first_rule_id,
            second_rule_id,
        });
    }

    if let Some((rule_id, applicable_post_merge)) =
        invariants::find_duplicate_any_approver_rules(rules).first()
    {
        return Err(MrgateError::DuplicateAnyApproverRule {
            rule_id: *rule_id,
            applicable_post_merge: *applicable_post_merge,
        });
    }

    Ok(())
}

fn validate_rules_individually(rules: &[Rule], requirement_check: RequirementCheck) -> Result<()> {
    if let Some((rule_id, reason)) = invariants::find_invalid_names(rules).into_iter().next() {
        return Err(MrgateError::InvalidRuleName { rule_id, reason });
    }

    if let Some((rule_id, value)) = requirement_check(rules).first() {
        return Err(MrgateError::ApprovalsRequiredOutOfRange {
            rule_id: *rule_id,
            value: *value,
            max: APPROVALS_REQUIRED_MAX,
        });
    }

    if let Some(rule_id) = invariants::find_any_approver_with_approvers(rules).first() {
        return Err(MrgateError::AnyApproverWithApprovers { rule_id: *rule_id });
    }

    Ok(())
}

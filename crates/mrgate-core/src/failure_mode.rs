//! Fail-open / fail-closed resolution for rules that cannot be satisfied

use crate::features::LicensedFeatures;
use crate::model::{MergeRequestSnapshot, Rule};

/// Whether an unsatisfiable `rule` lets the merge request through
///
/// Requires both a linked policy configured as fail-open and the licence
/// switch that enables fail-open policies. Everything else fails closed.
pub fn fail_open(rule: &Rule, features: &LicensedFeatures) -> bool {
    features.fail_open_policy_enabled && rule.policy.is_some_and(|policy| policy.fail_open)
}

/// Whether an invalid `rule` counts as approved
///
/// Rules generated from a scan result policy never block merge requests
/// of the project that hosts the policies.
pub fn allow_merge_when_invalid(
    rule: &Rule,
    merge_request: &MergeRequestSnapshot,
    features: &LicensedFeatures,
) -> bool {
    fail_open(rule, features)
        || (rule.from_scan_result_policy()
            && merge_request.project.security_policy_management_project)
}

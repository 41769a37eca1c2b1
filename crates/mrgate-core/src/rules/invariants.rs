use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::model::rule::{APPROVALS_REQUIRED_MAX, NAME_LENGTH_LIMIT};
use crate::model::{Rule, RuleKind};

/// Scope within which rule names must be unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum NameScope {
    Rule {
        tag: &'static str,
        section: Option<String>,
        applicable_post_merge: Option<bool>,
    },
    PolicyAction {
        orchestration_policy_idx: Option<u32>,
        action_idx: Option<u32>,
    },
}

fn name_scope(rule: &Rule) -> NameScope {
    match &rule.kind {
        RuleKind::ScanResultPolicy {
            orchestration_policy_idx,
            action_idx,
            ..
        } => NameScope::PolicyAction {
            orchestration_policy_idx: *orchestration_policy_idx,
            action_idx: *action_idx,
        },
        kind => NameScope::Rule {
            tag: kind.tag(),
            section: rule.code_owner_section().map(str::to_string),
            applicable_post_merge: rule.applicable_post_merge,
        },
    }
}

/// Why a rule name is unacceptable, if it is
pub fn name_problem(rule: &Rule) -> Option<String> {
    if rule.name.trim().is_empty() {
        return Some("name must not be blank".to_string());
    }
    let length = rule.name.chars().count();
    if length > NAME_LENGTH_LIMIT {
        return Some(format!(
            "name is {} characters, limit is {}",
            length, NAME_LENGTH_LIMIT
        ));
    }
    None
}

/// Find rules with a blank or overlong name
///
/// Returns list of (rule_id, reason) tuples
pub fn find_invalid_names(rules: &[Rule]) -> Vec<(u64, String)> {
    rules
        .iter()
        .filter_map(|rule| name_problem(rule).map(|reason| (rule.id, reason)))
        .collect()
}

/// Find rules whose stored requirement is outside `0..=APPROVALS_REQUIRED_MAX`
///
/// Returns list of (rule_id, approvals_required) tuples
pub fn find_out_of_range_requirements(rules: &[Rule]) -> Vec<(u64, i32)> {
    rules
        .iter()
        .filter(|rule| {
            rule.approvals_required < 0
                || rule.approvals_required.unsigned_abs() > APPROVALS_REQUIRED_MAX
        })
        .map(|rule| (rule.id, rule.approvals_required))
        .collect()
}

/// Find rules whose stored requirement exceeds `APPROVALS_REQUIRED_MAX`
///
/// Negative requirements are not reported; evaluation clamps them to 0.
///
/// Returns list of (rule_id, approvals_required) tuples
pub fn find_excessive_requirements(rules: &[Rule]) -> Vec<(u64, i32)> {
    rules
        .iter()
        .filter(|rule| rule.approvals_required.max(0).unsigned_abs() > APPROVALS_REQUIRED_MAX)
        .map(|rule| (rule.id, rule.approvals_required))
        .collect()
}

/// Find any-approver rules that list explicit users or groups
pub fn find_any_approver_with_approvers(rules: &[Rule]) -> Vec<u64> {
    rules
        .iter()
        .filter(|rule| rule.is_any_approver() && rule.has_explicit_approvers())
        .map(|rule| rule.id)
        .collect()
}

/// Find rules sharing a name within the same scope
///
/// Scan result policy rules that carry an orchestration policy index are
/// skipped: repeated definitions of one policy action collapse to the first
/// one during evaluation.
///
/// Returns list of (name, first_rule_id, duplicate_rule_id) tuples, in
/// definition order of the duplicates
pub fn find_duplicate_names(rules: &[Rule]) -> Vec<(String, u64, u64)> {
    let mut first_by_name: BTreeMap<(NameScope, &str), u64> = BTreeMap::new();
    let mut duplicates = Vec::new();

    for rule in rules {
        if matches!(rule.policy_action(), Some((Some(_), _))) {
            continue;
        }

        let key = (name_scope(rule), rule.name.as_str());
        match first_by_name.entry(key) {
            Entry::Occupied(first) => duplicates.push((rule.name.clone(), *first.get(), rule.id)),
            Entry::Vacant(slot) => {
                slot.insert(rule.id);
            }
        }
    }

    duplicates
}

/// Find any-approver rules beyond the first for each `applicable_post_merge` value
///
/// Returns list of (rule_id, applicable_post_merge) tuples
pub fn find_duplicate_any_approver_rules(rules: &[Rule]) -> Vec<(u64, Option<bool>)> {
    let mut seen: HashMap<Option<bool>, u64> = HashMap::new();
    let mut duplicates = Vec::new();

    for rule in rules.iter().filter(|r| r.is_any_approver()) {
        if seen.insert(rule.applicable_post_merge, rule.id).is_some() {
            duplicates.push((rule.id, rule.applicable_post_merge));
        }
    }

    duplicates
}

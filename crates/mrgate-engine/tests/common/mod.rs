use mrgate_core::model::{
    Approval, MergeRequestSnapshot, MergeRequestState, ProjectSettings, Rule, RuleKind, UserId,
};
use mrgate_engine::MergeRequestInput;

pub const AUTHOR: UserId = UserId::new(1000);

#[allow(dead_code)]
pub fn approvals(ids: &[u64]) -> Vec<Approval> {
    ids.iter().map(|id| Approval::new(UserId::new(*id))).collect()
}

#[allow(dead_code)]
pub fn regular_rule(id: u64, required: i32, approvers: &[u64]) -> Rule {
    Rule::new(id, format!("Rule {id}"), RuleKind::regular(), required)
        .with_users(approvers.iter().map(|u| UserId::new(*u)))
}

#[allow(dead_code)]
pub fn code_owner_rule(id: u64, required: i32, approvers: &[u64]) -> Rule {
    Rule::new(id, "Owners", RuleKind::code_owner("backend"), required)
        .with_users(approvers.iter().map(|u| UserId::new(*u)))
}

/// Open merge request 42 with the given rules and approvals
#[allow(dead_code)]
pub fn input(rules: Vec<Rule>, approved_by: &[u64]) -> MergeRequestInput {
    MergeRequestInput::new(MergeRequestSnapshot::new(
        42,
        AUTHOR,
        "main",
        ProjectSettings::new(7),
    ))
    .with_rules(rules)
    .with_approvals(approvals(approved_by))
}

#[allow(dead_code)]
pub fn merged(mut input: MergeRequestInput) -> MergeRequestInput {
    input.merge_request.state = MergeRequestState::Merged;
    input
}

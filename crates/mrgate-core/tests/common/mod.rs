use mrgate_core::model::{
    Approval, ApproverGroup, MergeRequestSnapshot, MergeRequestState, ProjectSettings, Rule,
    RuleKind, UserId,
};

pub const AUTHOR: UserId = UserId::new(1000);
pub const PROJECT_ID: u64 = 77;

/// Open merge request targeting `main` on a project with default settings
#[allow(dead_code)]
pub fn open_mr() -> MergeRequestSnapshot {
    MergeRequestSnapshot::new(1, AUTHOR, "main", ProjectSettings::new(PROJECT_ID))
}

#[allow(dead_code)]
pub fn merged_mr() -> MergeRequestSnapshot {
    open_mr().with_state(MergeRequestState::Merged)
}

#[allow(dead_code)]
pub fn users(ids: &[u64]) -> Vec<UserId> {
    ids.iter().map(|id| UserId::new(*id)).collect()
}

/// One approval per user id
#[allow(dead_code)]
pub fn approvals(ids: &[u64]) -> Vec<Approval> {
    ids.iter().map(|id| Approval::new(UserId::new(*id))).collect()
}

/// Regular rule with the given explicit approvers
#[allow(dead_code)]
pub fn regular_rule(id: u64, required: i32, approvers: &[u64]) -> Rule {
    Rule::new(id, format!("Rule {id}"), RuleKind::regular(), required).with_users(users(approvers))
}

#[allow(dead_code)]
pub fn code_owner_rule(id: u64, section: &str, required: i32, approvers: &[u64]) -> Rule {
    Rule::new(id, format!("Owners {section}"), RuleKind::code_owner(section), required)
        .with_users(users(approvers))
}

#[allow(dead_code)]
pub fn any_approver_rule(id: u64, required: i32) -> Rule {
    Rule::new(id, "All Members", RuleKind::AnyApprover, required)
}

#[allow(dead_code)]
pub fn group(id: u64, members: &[u64]) -> ApproverGroup {
    ApproverGroup::new(id, users(members))
}

#[allow(dead_code)]
pub fn user_set(ids: &[u64]) -> std::collections::BTreeSet<UserId> {
    users(ids).into_iter().collect()
}

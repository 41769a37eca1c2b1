use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRequestState {
    #[default]
    Opened,
    Closed,
    Locked,
    Merged,
}

/// Approval settings of the target project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub id: u64,

    /// The merge request author may approve their own change
    #[serde(default)]
    pub author_approval_allowed: bool,

    /// Users who pushed commits may not approve
    #[serde(default)]
    pub committers_approval_disabled: bool,

    /// Project hosts security policies for other projects
    #[serde(default)]
    pub security_policy_management_project: bool,
}

impl ProjectSettings {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Approval settings enforced by security policies, overriding the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyApprovalOverrides {
    #[serde(default)]
    pub prevent_approval_by_author: bool,
    #[serde(default)]
    pub prevent_approval_by_commit_author: bool,
}

/// Read-only view of a merge request at evaluation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestSnapshot {
    pub id: u64,
    #[serde(default)]
    pub state: MergeRequestState,
    pub author: UserId,
    #[serde(default)]
    pub committers: BTreeSet<UserId>,
    pub target_branch: String,
    pub project: ProjectSettings,
    #[serde(default)]
    pub policy_overrides: PolicyApprovalOverrides,

    /// Blocked or otherwise inactive accounts; never eligible
    #[serde(default)]
    pub blocked_users: BTreeSet<UserId>,

    /// Approvals were reset and are being recalculated
    #[serde(default)]
    pub temporarily_unapproved: bool,

    /// Caller-maintained counter bumped on any change relevant to approvals
    #[serde(default)]
    pub state_version: u64,
}

impl MergeRequestSnapshot {
    pub fn new(
        id: u64,
        author: UserId,
        target_branch: impl Into<String>,
        project: ProjectSettings,
    ) -> Self {
        Self {
            id,
            state: MergeRequestState::Opened,
            author,
            committers: BTreeSet::new(),
            target_branch: target_branch.into(),
            project,
            policy_overrides: PolicyApprovalOverrides::default(),
            blocked_users: BTreeSet::new(),
            temporarily_unapproved: false,
            state_version: 0,
        }
    }

    pub fn with_state(mut self, state: MergeRequestState) -> Self {
        self.state = state;
        self
    }

    pub fn with_committers(mut self, committers: impl IntoIterator<Item = UserId>) -> Self {
        self.committers.extend(committers);
        self
    }

    pub fn with_blocked_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.blocked_users.extend(users);
        self
    }

    pub fn with_policy_overrides(mut self, overrides: PolicyApprovalOverrides) -> Self {
        self.policy_overrides = overrides;
        self
    }

    pub fn is_merged(&self) -> bool {
        self.state == MergeRequestState::Merged
    }

    pub fn authors_can_approve(&self) -> bool {
        self.project.author_approval_allowed && !self.policy_overrides.prevent_approval_by_author
    }

    pub fn committers_can_approve(&self) -> bool {
        !self.project.committers_approval_disabled
            && !self.policy_overrides.prevent_approval_by_commit_author
    }

    /// Whether `user` is kept out of approver sets by author or committer rules
    pub fn excluded_as_author_or_committer(&self, user: UserId) -> bool {
        (!self.authors_can_approve() && user == self.author)
            || (!self.committers_can_approve() && self.committers.contains(&user))
    }
}

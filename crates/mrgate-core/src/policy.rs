//! Lookup traits for data owned by the host application
//!
//! Evaluation never queries storage. Branch protection and approver access
//! are supplied through these traits so the caller decides where the answers
//! come from.

use std::collections::BTreeSet;

use crate::model::UserId;

/// Branch protection lookup used by code owner evaluation
pub trait BranchProtection: Send + Sync {
    /// Whether protection on `branch` requires code owner approval
    fn branch_requires_code_owner_approval(&self, project_id: u64, branch: &str) -> bool;

    /// Whether the CODEOWNERS `section` is optional for `branch`
    fn optional_section(&self, project_id: u64, branch: &str, section: &str) -> bool;
}

/// Branch protection with fixed answers for every branch
///
/// # Example
/// ```
/// use mrgate_core::policy::{BranchProtection, StaticBranchProtection};
///
/// let protection = StaticBranchProtection::requiring_code_owners();
/// assert!(protection.branch_requires_code_owner_approval(1, "main"));
/// assert!(!protection.optional_section(1, "main", "docs"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticBranchProtection {
    requires_code_owner_approval: bool,
    optional_sections: BTreeSet<String>,
}

impl StaticBranchProtection {
    pub fn new(
        requires_code_owner_approval: bool,
        optional_sections: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            requires_code_owner_approval,
            optional_sections: optional_sections.into_iter().collect(),
        }
    }

    pub fn requiring_code_owners() -> Self {
        Self::new(true, [])
    }

    /// No branch requires code owner approval
    pub fn unprotected() -> Self {
        Self::default()
    }

    pub fn with_optional_section(mut self, section: impl Into<String>) -> Self {
        self.optional_sections.insert(section.into());
        self
    }
}

impl BranchProtection for StaticBranchProtection {
    fn branch_requires_code_owner_approval(&self, _project_id: u64, _branch: &str) -> bool {
        self.requires_code_owner_approval
    }

    fn optional_section(&self, _project_id: u64, _branch: &str, section: &str) -> bool {
        self.optional_sections.contains(section)
    }
}

/// Approve-permission lookup used by `eligible_for_approval_by`
pub trait ApproverAccess: Send + Sync {
    fn can_approve(&self, project_id: u64, user: UserId) -> bool;
}

/// Every user has approve access
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccess;

impl ApproverAccess for AllowAllAccess {
    fn can_approve(&self, _project_id: u64, _user: UserId) -> bool {
        true
    }
}

/// Only the listed users have approve access
///
/// # Example
/// ```
/// use mrgate_core::model::UserId;
/// use mrgate_core::policy::{ApproverAccess, SelectedAccess};
///
/// let access = SelectedAccess::new([UserId::new(7)]);
/// assert!(access.can_approve(1, UserId::new(7)));
/// assert!(!access.can_approve(1, UserId::new(8)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectedAccess {
    users: BTreeSet<UserId>,
}

impl SelectedAccess {
    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }
}

impl ApproverAccess for SelectedAccess {
    fn can_approve(&self, _project_id: u64, user: UserId) -> bool {
        self.users.contains(&user)
    }
}

use crate::features::LicensedFeatures;
use crate::model::{Approval, Comment, MergeRequestSnapshot, UserId};
use crate::policy::BranchProtection;
use std::collections::BTreeSet;

/// Inputs shared by every rule evaluated against one merge request
///
/// Borrowed for the duration of a single evaluation; nothing here is
/// mutated.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub merge_request: &'a MergeRequestSnapshot,
    pub approvals: &'a [Approval],
    pub comments: &'a [Comment],
    pub features: LicensedFeatures,
    pub branch_protection: &'a dyn BranchProtection,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        merge_request: &'a MergeRequestSnapshot,
        approvals: &'a [Approval],
        branch_protection: &'a dyn BranchProtection,
    ) -> Self {
        Self {
            merge_request,
            approvals,
            comments: &[],
            features: LicensedFeatures::default(),
            branch_protection,
        }
    }

    pub fn with_comments(mut self, comments: &'a [Comment]) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_features(mut self, features: LicensedFeatures) -> Self {
        self.features = features;
        self
    }

    /// Distinct users with an approval record
    pub fn approving_users(&self) -> BTreeSet<UserId> {
        self.approvals.iter().map(|a| a.user).collect()
    }

    /// Distinct authors of non-system comments
    pub fn commenting_users(&self) -> BTreeSet<UserId> {
        self.comments
            .iter()
            .filter(|c| !c.system)
            .map(|c| c.author)
            .collect()
    }
}

impl std::fmt::Debug for EvaluationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("merge_request_id", &self.merge_request.id)
            .field("approvals", &self.approvals.len())
            .field("comments", &self.comments.len())
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

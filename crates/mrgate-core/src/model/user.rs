use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// A group configured as approver on a rule
///
/// Membership is resolved by the caller before evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApproverGroup {
    pub id: u64,
    #[serde(default)]
    pub members: BTreeSet<UserId>,
}

impl ApproverGroup {
    pub fn new(id: u64, members: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id,
            members: members.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_ordering_follows_numeric_id() {
        let mut ids: Vec<UserId> = vec![UserId::new(3), UserId::new(1), UserId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![UserId::new(1), UserId::new(2), UserId::new(3)]);
    }

    #[test]
    fn test_user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(UserId::new(42).to_string(), "user:42");
    }

    #[test]
    fn test_group_members_deduplicated() {
        let group = ApproverGroup::new(1, [UserId::new(5), UserId::new(5), UserId::new(6)]);
        assert_eq!(group.members.len(), 2);
    }
}

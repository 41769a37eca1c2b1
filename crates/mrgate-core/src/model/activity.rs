//! Merge request activity records: approvals and comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// One user's approval of a merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

impl Approval {
    /// Approval recorded now
    pub fn new(user: UserId) -> Self {
        Self::at(user, Utc::now())
    }

    pub fn at(user: UserId, created_at: DateTime<Utc>) -> Self {
        Self { user, created_at }
    }
}

/// A note left on a merge request
///
/// System notes (generated by the application, e.g. "added 2 commits")
/// are authored by the acting user but never count as a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: UserId,
    #[serde(default)]
    pub system: bool,
}

impl Comment {
    pub fn by(author: UserId) -> Self {
        Self {
            author,
            system: false,
        }
    }

    pub fn system_note(author: UserId) -> Self {
        Self {
            author,
            system: true,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::change_id::parse_message;

/// One commit as seen by the indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub change_id: String,
    pub commit_id: String,
    pub title: String,
}

impl CommitRecord {
    pub fn new(
        change_id: impl Into<String>,
        commit_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        CommitRecord {
            change_id: change_id.into(),
            commit_id: commit_id.into(),
            title: title.into(),
        }
    }

    /// Build a record from a commit hash and its raw message
    pub fn from_message(commit_id: impl Into<String>, message: &str) -> Self {
        let parsed = parse_message(message);
        CommitRecord {
            change_id: parsed.change_id.unwrap_or_default(),
            commit_id: commit_id.into(),
            title: parsed.title,
        }
    }

    /// Commits without a Change-Id trailer carry no identity
    pub fn has_change_id(&self) -> bool {
        !self.change_id.is_empty()
    }
}

/// A `<Change-Id> <commit-id>` pair from the ignore file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreEntry {
    pub change_id: String,
    pub commit_id: String,
}

impl IgnoreEntry {
    pub fn new(change_id: impl Into<String>, commit_id: impl Into<String>) -> Self {
        IgnoreEntry {
            change_id: change_id.into(),
            commit_id: commit_id.into(),
        }
    }
}

impl From<IgnoreEntry> for CommitRecord {
    fn from(entry: IgnoreEntry) -> Self {
        CommitRecord {
            change_id: entry.change_id,
            commit_id: entry.commit_id,
            title: String::new(),
        }
    }
}

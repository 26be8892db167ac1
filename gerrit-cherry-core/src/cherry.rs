use tracing::{debug, info};

use crate::diff::unmerged;
use crate::error::Result;
use crate::index::ChangeIndex;
use crate::record::{CommitRecord, IgnoreEntry};
use crate::source::CommitSource;

pub const DEFAULT_HEAD: &str = "HEAD";

/// Finds changes of one branch that have not landed on another
pub struct Cherry<S> {
    source: S,
    head: String,
    ignores: Vec<IgnoreEntry>,
}

impl<S: CommitSource> Cherry<S> {
    pub fn new(source: S) -> Self {
        Cherry {
            source,
            head: DEFAULT_HEAD.to_string(),
            ignores: Vec::new(),
        }
    }

    /// Reference branch to compare against
    pub fn head(mut self, reference: impl Into<String>) -> Self {
        self.head = reference.into();
        self
    }

    /// Changes to treat as already merged
    pub fn ignores(mut self, entries: impl IntoIterator<Item = IgnoreEntry>) -> Self {
        self.ignores.extend(entries);
        self
    }

    /// Commits of `other` missing from HEAD, in `other`'s history order.
    ///
    /// Any source error aborts the whole run; nothing is partially returned.
    pub fn run(&self, other: &str) -> Result<Vec<CommitRecord>> {
        let mut head_index = ChangeIndex::build(self.source.commits(&self.head)?);
        debug!("Indexed {} changes on {}", head_index.len(), self.head);

        let other_index = ChangeIndex::build(self.source.commits(other)?);
        debug!("Indexed {} changes on {}", other_index.len(), other);

        head_index.merge_ignores(self.ignores.iter().cloned());

        let result = unmerged(&head_index, &other_index);
        info!(
            "{} of {} changes on {} are not on {}",
            result.len(),
            other_index.len(),
            other,
            self.head
        );
        Ok(result)
    }
}

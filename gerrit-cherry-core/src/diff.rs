use crate::index::ChangeIndex;
use crate::record::CommitRecord;

/// Commits of `other` whose Change-Id is absent from `head`.
///
/// Only key presence in `head` matters. The result follows `other`'s
/// discovery order; neither index is modified.
pub fn unmerged(head: &ChangeIndex, other: &ChangeIndex) -> Vec<CommitRecord> {
    other
        .iter()
        .filter(|record| !head.contains(&record.change_id))
        .cloned()
        .collect()
}

use std::collections::HashMap;

use crate::record::{CommitRecord, IgnoreEntry};

/// Change-Id keyed view of one history traversal
#[derive(Debug, Clone, Default)]
pub struct ChangeIndex {
    by_id: HashMap<String, CommitRecord>,
    order: Vec<String>,
}

impl ChangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index records in traversal order (newest first).
    ///
    /// Records without a Change-Id are skipped. When two records share a
    /// Change-Id the one seen first is kept.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert if the Change-Id is new. Returns whether the record was kept.
    pub fn insert(&mut self, record: CommitRecord) -> bool {
        if !record.has_change_id() || self.by_id.contains_key(&record.change_id) {
            return false;
        }
        self.order.push(record.change_id.clone());
        self.by_id.insert(record.change_id.clone(), record);
        true
    }

    /// Treat ignore entries as already present.
    ///
    /// Entries overwrite existing records and are not added to the
    /// discovery order, so after a merge `len()` may exceed `order().len()`.
    pub fn merge_ignores<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = IgnoreEntry>,
    {
        for entry in entries {
            self.by_id.insert(entry.change_id.clone(), entry.into());
        }
    }

    pub fn contains(&self, change_id: &str) -> bool {
        self.by_id.contains_key(change_id)
    }

    pub fn get(&self, change_id: &str) -> Option<&CommitRecord> {
        self.by_id.get(change_id)
    }

    /// Number of distinct Change-Ids
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Change-Ids in discovery order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Records in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &CommitRecord> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

impl FromIterator<CommitRecord> for ChangeIndex {
    fn from_iter<I: IntoIterator<Item = CommitRecord>>(iter: I) -> Self {
        Self::build(iter)
    }
}

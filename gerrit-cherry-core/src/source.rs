use std::collections::HashMap;

use crate::error::{CherryError, Result};
use crate::record::CommitRecord;

/// Anything that can list the history behind a reference
pub trait CommitSource {
    /// Records reachable from `reference`, newest first
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>>;
}

impl<S: CommitSource + ?Sized> CommitSource for &S {
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>> {
        (**self).commits(reference)
    }
}

impl<S: CommitSource + ?Sized> CommitSource for Box<S> {
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>> {
        (**self).commits(reference)
    }
}

/// Histories held in memory, keyed by reference name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    histories: HashMap<String, Vec<CommitRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(
        mut self,
        reference: impl Into<String>,
        records: impl IntoIterator<Item = CommitRecord>,
    ) -> Self {
        self.insert(reference, records);
        self
    }

    pub fn insert(
        &mut self,
        reference: impl Into<String>,
        records: impl IntoIterator<Item = CommitRecord>,
    ) {
        self.histories
            .insert(reference.into(), records.into_iter().collect());
    }
}

impl CommitSource for MemorySource {
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>> {
        self.histories
            .get(reference)
            .cloned()
            .ok_or_else(|| CherryError::UnresolvedReference {
                reference: reference.to_string(),
                tried: vec![reference.to_string()],
            })
    }
}

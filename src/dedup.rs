//! Run-wide deduplication of job records
//!
//! Records are keyed on their (title, url) pair. The first occurrence wins
//! and insertion order is preserved.

use crate::records::JobRecord;
use std::collections::HashSet;

/// Accumulates unique records across every page of a run
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<(String, String)>,
    records: Vec<JobRecord>,
    duplicates: usize,
    rejected: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record if its identity pair has not been seen yet
    ///
    /// # Returns
    ///
    /// * `true` - The record was inserted
    /// * `false` - The record repeats an earlier one, or lacks a real title or url
    pub fn add(&mut self, record: JobRecord) -> bool {
        if !record.has_identity() {
            self.rejected += 1;
            return false;
        }

        let key = (record.title.clone(), record.url.clone());
        if !self.seen.insert(key) {
            self.duplicates += 1;
            return false;
        }

        self.records.push(record);
        true
    }

    /// Adds every record in `batch`, returning how many were new
    pub fn extend<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = JobRecord>,
    {
        let mut added = 0;
        for record in batch {
            if self.add(record) {
                added += 1;
            }
        }
        added
    }

    /// Keeps only the records matching `keep`, preserving order
    ///
    /// Dropped records stay in the seen-set, so they cannot be re-added.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&JobRecord) -> bool,
    {
        self.records.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records dropped as repeats
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of records dropped for lacking an identity pair
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

//! Record collection shared by the bundled repositories

use std::collections::HashSet;

use crate::criteria::Criteria;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::Record;

/// Ordered set of records keyed by [`Record::id`]
///
/// Records keep their insertion order; updates replace in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, later duplicates replacing earlier ones
    pub fn from_records(records: Vec<T>) -> Self {
        let mut collection = Self::new();
        collection.upsert(records);
        collection
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All matching records, possibly none
    pub fn find(&self, criteria: &Criteria) -> Vec<T> {
        self.records
            .iter()
            .filter(|record| record.matches(criteria))
            .cloned()
            .collect()
    }

    /// First matching record
    pub fn find_one(&self, criteria: &Criteria) -> Option<T> {
        self.records
            .iter()
            .find(|record| record.matches(criteria))
            .cloned()
    }

    /// Add new records
    ///
    /// Fails without changing anything if any id is already present, or
    /// appears twice in `records`.
    pub fn insert(&mut self, records: Vec<T>) -> StorageResult<Vec<T>> {
        let mut seen = HashSet::new();
        for record in &records {
            let id = record.id();
            if self.contains(&id) || !seen.insert(id.clone()) {
                return Err(StorageError::Conflict { id });
            }
        }

        self.records.extend(records.iter().cloned());
        Ok(records)
    }

    /// Replace existing records, returning the ones that were replaced
    ///
    /// Records with unknown ids are skipped.
    pub fn update(&mut self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .filter_map(|record| {
                let index = self.position(&record.id())?;
                self.records[index] = record.clone();
                Some(record)
            })
            .collect()
    }

    /// Replace one existing record
    pub fn update_one(&mut self, record: T) -> StorageResult<T> {
        let id = record.id();
        let index = self
            .position(&id)
            .ok_or(StorageError::NotFound { id })?;
        self.records[index] = record.clone();
        Ok(record)
    }

    /// Delete records by id, returning the ones that were present
    pub fn remove(&mut self, records: Vec<T>) -> Vec<T> {
        let ids: HashSet<String> = records.iter().map(|record| record.id()).collect();
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|record| ids.contains(&record.id()));
        self.records = kept;
        removed
    }

    /// Insert or replace each record
    pub fn upsert(&mut self, records: Vec<T>) -> Vec<T> {
        for record in &records {
            match self.position(&record.id()) {
                Some(index) => self.records[index] = record.clone(),
                None => self.records.push(record.clone()),
            }
        }
        records
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}

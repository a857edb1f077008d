//! Bundled repositories
//!
//! Two ready-made [`Repository`](crate::Repository) implementations for any
//! [`Record`]:
//!
//! - [`MemoryRepository`]: records held in memory, handy as a cache or in tests
//! - [`JsonFileRepository`]: records kept in a JSON array file on disk
//!
//! Both share the semantics of [`Collection`] and can be switched off with
//! `set_available(false)`, after which every call fails with
//! [`StorageError::Unavailable`]. That makes it easy to play out a remote
//! going offline.

pub mod collection;
pub mod error;
pub mod file;
pub mod memory;

pub use collection::Collection;
pub use error::{StorageError, StorageResult};
pub use file::JsonFileRepository;
pub use memory::MemoryRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::criteria::Criteria;
use crate::outcome::Outcome;
use crate::strategy::StoreKind;

/// A model the bundled repositories can hold
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identity used to detect duplicates and find existing records
    fn id(&self) -> String;

    /// Whether the record satisfies the criteria
    ///
    /// Defaults to field equality on the record's JSON object.
    fn matches(&self, criteria: &Criteria) -> bool {
        if criteria.is_empty() {
            return true;
        }
        serde_json::to_value(self)
            .map(|value| criteria.matches_object(&value))
            .unwrap_or(false)
    }
}

/// Turn a storage result into an outcome tagged with the store kind
pub(crate) fn settle<D>(kind: StoreKind, result: StorageResult<D>) -> Outcome<D> {
    match result {
        Ok(data) => Outcome::success(kind, data),
        Err(e) => Outcome::failure(kind, e),
    }
}

/// Like [`settle`], with no match reported as an empty outcome
pub(crate) fn settle_optional<D>(kind: StoreKind, result: StorageResult<Option<D>>) -> Outcome<D> {
    match result {
        Ok(Some(data)) => Outcome::success(kind, data),
        Ok(None) => Outcome::empty(kind),
        Err(e) => Outcome::failure(kind, e),
    }
}

//! Outcome envelope
//!
//! Every repository call and every dispatch produces an [`Outcome`]: the data
//! (if any), the error (if any), the store the data came from, and a
//! diagnostic trail of the raw sub-results seen along the way.
//!
//! The trail is kept in [`Metadata`], one entry map per [`StoreKind`]. The
//! dispatcher stores a [`Snapshot`] of each store's raw outcome under
//! [`RAW_KEY`]; repositories may add their own entries.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::strategy::StoreKind;

/// Metadata key holding a store's raw outcome
pub const RAW_KEY: &str = "_raw";

/// Result of one operation
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub data: Option<T>,
    pub error: Option<Error>,
    pub origin: Option<StoreKind>,
    pub metadata: Metadata,
}

impl<T> Outcome<T> {
    /// Successful outcome carrying data
    pub fn success(origin: StoreKind, data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            origin: Some(origin),
            metadata: Metadata::default(),
        }
    }

    /// Successful outcome without data (nothing matched, nothing returned)
    pub fn empty(origin: StoreKind) -> Self {
        Self {
            data: None,
            error: None,
            origin: Some(origin),
            metadata: Metadata::default(),
        }
    }

    /// Failed outcome reported by a store
    pub fn failure(origin: StoreKind, error: impl Into<Error>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            origin: Some(origin),
            metadata: Metadata::default(),
        }
    }

    /// Failed outcome with no store involved
    pub fn from_error(error: Error) -> Self {
        Self {
            data: None,
            error: Some(error),
            origin: None,
            metadata: Metadata::default(),
        }
    }

    /// Replace the metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Transform the data, keeping error, origin and metadata
    pub fn map<U>(self, f: impl FnOnce(T) -> Option<U>) -> Outcome<U> {
        Outcome {
            data: self.data.and_then(f),
            error: self.error,
            origin: self.origin,
            metadata: self.metadata,
        }
    }

    /// Drop the envelope and keep the data or the error
    ///
    /// An error wins over data: a failed synchronization is reported even
    /// though the target returned data.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Outcome<T> {
    /// Snapshot of this outcome for a diagnostic trail
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            origin: self.origin,
            error: self.error.clone(),
            data: self
                .data
                .clone()
                .map(|data| Arc::new(data) as Arc<dyn Any + Send + Sync>),
        }
    }
}

/// Per-store diagnostic entries
///
/// Both store kinds always have an entry map, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    entries: HashMap<StoreKind, BTreeMap<String, Snapshot>>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            entries: StoreKind::ALL
                .into_iter()
                .map(|kind| (kind, BTreeMap::new()))
                .collect(),
        }
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries recorded for a store
    pub fn entries(&self, kind: StoreKind) -> &BTreeMap<String, Snapshot> {
        self.entries
            .get(&kind)
            .unwrap_or_else(|| empty_entries())
    }

    /// A single entry
    pub fn get(&self, kind: StoreKind, key: &str) -> Option<&Snapshot> {
        self.entries.get(&kind).and_then(|entries| entries.get(key))
    }

    /// The raw outcome recorded for a store
    pub fn raw(&self, kind: StoreKind) -> Option<&Snapshot> {
        self.get(kind, RAW_KEY)
    }

    pub fn insert(&mut self, kind: StoreKind, key: impl Into<String>, snapshot: Snapshot) {
        self.entries
            .entry(kind)
            .or_default()
            .insert(key.into(), snapshot);
    }

    /// Record the raw outcome of a store
    pub fn set_raw(&mut self, kind: StoreKind, snapshot: Snapshot) {
        self.insert(kind, RAW_KEY, snapshot);
    }

    /// Replace every entry of a store
    pub fn replace(&mut self, kind: StoreKind, entries: BTreeMap<String, Snapshot>) {
        self.entries.insert(kind, entries);
    }

    /// Remove and return every entry of a store, leaving it empty
    pub fn take(&mut self, kind: StoreKind) -> BTreeMap<String, Snapshot> {
        self.entries
            .get_mut(&kind)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Whether no store has any entry
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }
}

fn empty_entries() -> &'static BTreeMap<String, Snapshot> {
    static EMPTY: BTreeMap<String, Snapshot> = BTreeMap::new();
    &EMPTY
}

/// Immutable copy of a raw outcome
///
/// The data is type-erased so that snapshots of single-item and collection
/// outcomes can share one trail; [`Snapshot::data`] recovers it by type.
#[derive(Clone)]
pub struct Snapshot {
    origin: Option<StoreKind>,
    error: Option<Error>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Snapshot {
    pub fn origin(&self) -> Option<StoreKind> {
        self.origin
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// The recorded data, if it is a `D`
    pub fn data<D: 'static>(&self) -> Option<&D> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<D>())
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("origin", &self.origin)
            .field("error", &self.error)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

impl PartialEq for Snapshot {
    /// Snapshots are equal when they are copies of the same outcome
    fn eq(&self, other: &Self) -> bool {
        let same_data = match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        let same_error = match (&self.error, &other.error) {
            (Some(a), Some(b)) => a.to_string() == b.to_string(),
            (None, None) => true,
            _ => false,
        };
        self.origin == other.origin && same_data && same_error
    }
}

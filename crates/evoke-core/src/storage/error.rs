//! Storage error handling
//!
//! Provides typed errors for the bundled repositories with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::strategy::StoreKind;

/// Errors that can occur inside a bundled repository
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store has been switched off
    #[error("The {kind} store is unavailable")]
    Unavailable { kind: StoreKind },

    /// A record with the same ID already exists
    #[error("Record '{id}' already exists")]
    Conflict { id: String },

    /// No record with this ID exists
    #[error("Record '{id}' not found")]
    NotFound { id: String },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File contents are not a JSON array of records
    #[error("Invalid store format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Records could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind.
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::Unavailable { .. } | StorageError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::Unavailable { .. } => Some("Check connectivity and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions.")
            }
            StorageError::InvalidFormat { .. } => {
                Some("The store file must contain a JSON array. Fix or remove it.")
            }
            _ => None,
        }
    }
}

impl From<StorageError> for crate::Error {
    fn from(error: StorageError) -> Self {
        crate::Error::repository(error)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Error types and result types for persistence operations.
//!
//! This module provides error handling for all store operations.
//! Use [`PersistenceResult<T>`] as the return type for fallible operations, and
//! [`WriteResult<T>`] for mutations whose in-memory effect must be reported even
//! when the follow-up save fails.

use std::{error::Error as StdError, fmt, io};
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a store.
///
/// Lookups that find nothing are not errors: id-targeted reads, updates and deletes
/// return `Ok(None)` instead.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The store or persister is missing required configuration (e.g. a data file path).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The backing file exists but could not be read.
    #[error("Failed to read data file {path}: {source}")]
    Read {
        /// Path of the backing file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file could not be written.
    #[error("Failed to write data file {path}: {source}")]
    Write {
        /// Path of the backing file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Encoding or decoding records to/from JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A partial update carried a value that does not fit the target field.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
    /// A custom loader or saver reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl From<SerdeJsonError> for PersistenceError {
    fn from(err: SerdeJsonError) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// Failure of a mutating store operation.
///
/// The store stays the leader: when a mutation was applied in memory but the
/// follow-up save failed, the record is already part of the in-memory state and
/// is handed back in [`WriteError::record`] together with the save error, so callers
/// can decide whether to retry the save or surface the failure. When the mutation
/// was rejected before touching the store, `record` is `None`.
#[derive(Debug)]
pub struct WriteError<T> {
    /// The record as it now exists in memory, if the mutation was applied.
    pub record: Option<T>,
    /// The underlying failure.
    pub error: PersistenceError,
}

impl<T> WriteError<T> {
    /// The mutation was applied in memory but saving it failed.
    pub fn unsaved(record: T, error: PersistenceError) -> Self {
        Self { record: Some(record), error }
    }

    /// The mutation was rejected and the store is unchanged.
    pub fn rejected(error: PersistenceError) -> Self {
        Self { record: None, error }
    }

    /// Returns `true` if the in-memory state reflects the mutation.
    pub fn is_applied(&self) -> bool {
        self.record.is_some()
    }

    /// Returns the in-memory record, dropping the error.
    pub fn into_record(self) -> Option<T> {
        self.record
    }

    /// Returns the underlying error, dropping the record.
    pub fn into_error(self) -> PersistenceError {
        self.error
    }
}

impl<T> fmt::Display for WriteError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(_) => write!(f, "Record changed in memory but not saved: {}", self.error),
            None => write!(f, "Record not changed: {}", self.error),
        }
    }
}

impl<T: fmt::Debug> StdError for WriteError<T> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<WriteError<T>> for PersistenceError {
    fn from(err: WriteError<T>) -> Self {
        err.error
    }
}

/// Result of a mutating operation; see [`WriteError`].
pub type WriteResult<T> = Result<T, WriteError<T>>;

/// Result of a mutating operation targeting a record that may not exist.
pub type OptionalWriteResult<T> = Result<Option<T>, WriteError<T>>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_become_serialization_errors() {
        let err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();

        assert!(matches!(PersistenceError::from(err), PersistenceError::Serialization(_)));
    }

    #[test]
    fn read_error_keeps_its_cause() {
        let err = PersistenceError::Read {
            path: "data.json".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert_eq!(err.to_string(), "Failed to read data file data.json: denied");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn unsaved_write_converts_into_its_save_error() {
        let unsaved = WriteError::unsaved(7u32, PersistenceError::Backend("disk full".into()));
        assert!(unsaved.is_applied());
        assert_eq!(unsaved.record, Some(7));

        let err: PersistenceError = unsaved.into();
        assert!(matches!(err, PersistenceError::Backend(msg) if msg == "disk full"));
    }

    #[test]
    fn rejected_write_carries_no_record() {
        let rejected: WriteError<u32> = WriteError::rejected(PersistenceError::InvalidPatch("bad".into()));

        assert!(!rejected.is_applied());
        assert_eq!(rejected.to_string(), "Record not changed: Invalid patch: bad");
    }
}

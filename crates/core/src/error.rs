//! Error taxonomy for store operations.

use std::io;
use thiserror::Error;

/// Errors returned by [`Store`](crate::storage::Store) operations.
///
/// Nothing is retried or recovered internally; every failure reaches the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An empty collection or resource name was supplied where one is required.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The collection or resource does not exist under either naming form.
    #[error("not found: {0}")]
    NotFound(String),

    /// The document could not be converted to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The stored bytes are not a valid document of the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Directory creation, file write, rename, read or removal failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Maps an OS "not found" into [`StoreError::NotFound`] naming `what`;
    /// every other error kind stays [`StoreError::Io`].
    pub(crate) fn from_io(err: io::Error, what: impl FnOnce() -> String) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(what())
        } else {
            StoreError::Io(err)
        }
    }
}

/// Result alias used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

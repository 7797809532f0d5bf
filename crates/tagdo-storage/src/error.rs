//! Error types for the storage layer.

use std::io;

/// Errors that can occur while reading or writing storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key can't be used by this backend (e.g. it isn't a safe file
    /// name for [`FileBackend`](crate::FileBackend)).
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// The underlying I/O operation failed.
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

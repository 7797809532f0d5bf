//! Durable key-value storage for Tagdo.
//!
//! The session layer persists exactly one value (the raw token) and needs
//! to hear about changes made by *other* execution contexts that share
//! the same storage, the way browser tabs of one origin share
//! `localStorage` and see each other's writes through `storage` events.
//!
//! This crate models that without depending on a browser:
//!
//! - [`Storage`] is what the session layer talks to: get, set, remove,
//!   and a stream of [`StorageEvent`]s from other contexts.
//! - [`Backend`] is where bytes actually live: [`MemoryBackend`] for
//!   tests and single-process apps, [`FileBackend`] for data that must
//!   survive a restart.
//! - [`ScopedStorage`] glues the two together. Every handle is one
//!   context; [`ScopedStorage::new_context`] opens a sibling that shares
//!   the backend and the notification channel.
//!
//! ```text
//!   context A ──set()──→ Backend
//!       │                   ↑
//!       └──StorageEvent──→ context B, C, ... (never back to A)
//! ```

mod context;
mod error;
mod file;
mod memory;
mod scope;

pub use context::ContextId;
pub use error::StorageError;
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use scope::{ScopedStorage, StorageEvents};

/// In-process storage scope.
pub type MemoryStorage = ScopedStorage<MemoryBackend>;

/// Storage scope persisted to a directory on disk.
pub type FileStorage = ScopedStorage<FileBackend>;

/// A change made to the storage by some context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The context that made the change.
    pub origin: ContextId,
    /// The key that changed.
    pub key: String,
    /// The value after the change, `None` if the key was removed.
    pub new_value: Option<String>,
}

/// A key-value store shared by one or more execution contexts.
///
/// Operations are synchronous: the session layer runs them to completion
/// without yielding. Change notifications are the only async part and
/// arrive through [`events`](Self::events).
pub trait Storage: Send + Sync + 'static {
    /// Reads the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribes to changes made by other contexts sharing this scope.
    fn events(&self) -> StorageEvents;
}

/// Where stored values actually live.
///
/// A backend knows nothing about contexts or notifications; that is
/// [`ScopedStorage`]'s job.
pub trait Backend: Send + Sync + 'static {
    /// Reads the value under `key`, `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

//! The registry that owns the process-wide session store.

use std::sync::{Arc, OnceLock};

use tagdo_storage::Storage;

use crate::{Clock, SessionConfig, SessionStore, SystemClock};

/// Owns the one [`SessionStore`] for an application.
///
/// The store is built lazily, on the first call to [`store`](Self::store),
/// and every later call returns the same instance. The registry itself is
/// an ordinary value: the application creates one at startup and passes
/// it (or the store) to the request layer, route guards and UI. Tests
/// just create their own.
///
/// ```rust
/// use tagdo_session::{SessionConfig, SessionRegistry};
/// use tagdo_storage::{MemoryBackend, MemoryStorage};
///
/// let registry = SessionRegistry::new(
///     SessionConfig::default(),
///     MemoryStorage::open(MemoryBackend::new()),
/// );
/// assert!(!registry.is_initialized());
///
/// let store = registry.store();
/// assert_eq!(store.storage_key(), "todo_auth_token");
/// assert!(registry.is_initialized());
/// ```
pub struct SessionRegistry {
    config: SessionConfig,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    store: OnceLock<SessionStore>,
}

impl SessionRegistry {
    /// Creates a registry; the store is not built yet.
    pub fn new(config: SessionConfig, storage: impl Storage) -> Self {
        Self {
            config,
            storage: Arc::new(storage),
            clock: Arc::new(SystemClock),
            store: OnceLock::new(),
        }
    }

    /// Creates a registry with the storage key from the environment
    /// (see [`SessionConfig::from_env`]).
    pub fn from_env(storage: impl Storage) -> Self {
        Self::new(SessionConfig::from_env(), storage)
    }

    /// Replaces the clock the store will be built with.
    ///
    /// Has no effect once the store exists.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The store, built on first access.
    pub fn store(&self) -> &SessionStore {
        self.store.get_or_init(|| {
            tracing::debug!(key = %self.config.storage_key, "building session store");
            SessionStore::from_parts(
                self.config.clone(),
                Arc::clone(&self.storage),
                Arc::clone(&self.clock),
            )
        })
    }

    /// Whether [`store`](Self::store) has been called yet.
    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    /// The configuration the store is (or will be) built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use tagdo_storage::{MemoryBackend, MemoryStorage};

    use super::*;

    #[test]
    fn test_store_returns_same_instance() {
        let registry = SessionRegistry::new(
            SessionConfig::with_storage_key("k"),
            MemoryStorage::open(MemoryBackend::new()),
        );

        let first = registry.store() as *const SessionStore;
        let second = registry.store() as *const SessionStore;

        assert_eq!(first, second);
        assert_eq!(registry.store().storage_key(), "k");
    }

    #[test]
    fn test_separate_registries_are_isolated() {
        let a = SessionRegistry::new(
            SessionConfig::default(),
            MemoryStorage::open(MemoryBackend::new()),
        );
        let b = SessionRegistry::new(
            SessionConfig::default(),
            MemoryStorage::open(MemoryBackend::new()),
        );

        a.store().set("not-a-jwt");
        b.store().clear();

        assert_eq!(a.store().listener_count(), 0);
        assert!(!b.store().snapshot().authenticated);
    }
}

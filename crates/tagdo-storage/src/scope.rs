//! Storage scopes: several contexts sharing one backend.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::context::ContextIds;
use crate::{Backend, ContextId, Storage, StorageError, StorageEvent};

/// Capacity of the change-notification channel shared by a scope.
const EVENT_CHANNEL_SIZE: usize = 64;

struct Shared<B> {
    backend: B,
    events: broadcast::Sender<StorageEvent>,
    contexts: ContextIds,
}

/// One execution context's handle onto a shared storage scope.
///
/// Every context reads and writes the same [`Backend`]. When a context
/// changes a value, every *other* context in the scope receives a
/// [`StorageEvent`]. A context never hears about its own writes, and a
/// write that doesn't change anything (setting the same value, removing
/// an absent key) notifies nobody.
///
/// Cloning gives another handle to the *same* context. Use
/// [`new_context`](Self::new_context) for a sibling context.
///
/// # Example
///
/// ```rust
/// use tagdo_storage::{MemoryBackend, MemoryStorage, Storage};
///
/// let tab_a = MemoryStorage::open(MemoryBackend::new());
/// let tab_b = tab_a.new_context();
///
/// tab_a.set("token", "abc").unwrap();
/// assert_eq!(tab_b.get("token").unwrap().as_deref(), Some("abc"));
/// ```
pub struct ScopedStorage<B: Backend> {
    id: ContextId,
    shared: Arc<Shared<B>>,
}

impl<B: Backend> ScopedStorage<B> {
    /// Opens a new scope over `backend` and returns its first context.
    pub fn open(backend: B) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            id: ContextId::FIRST,
            shared: Arc::new(Shared {
                backend,
                events,
                contexts: ContextIds::after_first(),
            }),
        }
    }

    /// Opens another context in the same scope.
    pub fn new_context(&self) -> Self {
        Self {
            id: self.shared.contexts.issue(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// This context's identifier.
    pub fn context_id(&self) -> ContextId {
        self.id
    }

    /// The backend shared by the scope.
    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    fn notify(&self, key: &str, new_value: Option<&str>) {
        let event = StorageEvent {
            origin: self.id,
            key: key.to_owned(),
            new_value: new_value.map(str::to_owned),
        };
        // No receivers just means no other context is listening.
        let delivered = self.shared.events.send(event).unwrap_or(0);
        tracing::trace!(context = %self.id, key, delivered, "storage change broadcast");
    }
}

impl<B: Backend> Clone for ScopedStorage<B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: Backend> Storage for ScopedStorage<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.shared.backend.read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Read first so an unchanged value can stay silent, the way a
        // browser skips the `storage` event for a same-value write.
        let previous = self.shared.backend.read(key)?;
        self.shared.backend.write(key, value)?;
        if previous.as_deref() != Some(value) {
            self.notify(key, Some(value));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        // Only an entry that existed produces a removal event.
        let previous = self.shared.backend.read(key)?;
        self.shared.backend.delete(key)?;
        if previous.is_some() {
            self.notify(key, None);
        }
        Ok(())
    }

    fn events(&self) -> StorageEvents {
        StorageEvents {
            own: self.id,
            rx: self.shared.events.subscribe(),
        }
    }
}

/// Changes made by other contexts in a scope, in the order they happened.
pub struct StorageEvents {
    own: ContextId,
    rx: broadcast::Receiver<StorageEvent>,
}

impl StorageEvents {
    /// Waits for the next change made by another context.
    ///
    /// Returns `None` once every context in the scope has been dropped.
    /// If this receiver fell behind, the missed events are logged and
    /// skipped.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.own => continue,
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(context = %self.own, skipped, "storage events lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

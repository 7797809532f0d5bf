//! The session facade used by the rest of the application.
//!
//! Consumers don't hold the store directly. An [`AuthProvider`] opens a
//! scope around a consumer (a page, a request handler, a UI task); inside
//! it, [`use_auth`] returns an [`AuthContext`] that mirrors the latest
//! snapshot and forwards `set_token` / `clear` to the store. When the
//! scope ends, the context's subscription is dropped with it.
//!
//! ```rust
//! use tagdo_session::{AuthProvider, SessionConfig, SessionRegistry, SessionError, use_auth};
//! use tagdo_storage::{MemoryBackend, MemoryStorage};
//!
//! let registry = SessionRegistry::new(
//!     SessionConfig::default(),
//!     MemoryStorage::open(MemoryBackend::new()),
//! );
//! let provider = AuthProvider::new(&registry);
//!
//! let signed_in = provider.scope_sync(|| use_auth().unwrap().is_authenticated());
//! assert!(!signed_in);
//!
//! assert_eq!(use_auth().unwrap_err(), SessionError::OutsideProvider);
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tagdo_token::{Claims, Token};

use crate::{SessionError, SessionRegistry, SessionSnapshot, SessionStore, Subscription};

tokio::task_local! {
    static AUTH: AuthContext;
}

/// Opens scopes in which [`use_auth`] works.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    store: SessionStore,
}

impl AuthProvider {
    /// Provider over the registry's store (building it if needed).
    pub fn new(registry: &SessionRegistry) -> Self {
        Self::from_store(registry.store().clone())
    }

    /// Provider over an existing store.
    pub fn from_store(store: SessionStore) -> Self {
        Self { store }
    }

    /// Runs `consumer` with an [`AuthContext`] bound for its whole
    /// lifetime. The binding's subscription ends when `consumer` does.
    pub async fn scope<F: Future>(&self, consumer: F) -> F::Output {
        AUTH.scope(AuthContext::bind(self.store.clone()), consumer)
            .await
    }

    /// Synchronous version of [`scope`](Self::scope).
    pub fn scope_sync<R>(&self, consumer: impl FnOnce() -> R) -> R {
        AUTH.sync_scope(AuthContext::bind(self.store.clone()), consumer)
    }
}

/// The application's view of the session.
///
/// Holds the latest snapshot pushed by the store. Clones share the same
/// binding; the subscription ends when the last clone is dropped.
#[derive(Clone)]
pub struct AuthContext {
    store: SessionStore,
    current: Arc<Mutex<SessionSnapshot>>,
    _subscription: Arc<Subscription>,
}

impl AuthContext {
    /// Subscribes to `store` and starts mirroring its snapshots.
    pub fn bind(store: SessionStore) -> Self {
        let current = Arc::new(Mutex::new(SessionSnapshot::default()));
        let sink = Arc::clone(&current);
        let subscription = store.subscribe(move |snap| *lock(&sink) = snap.clone());

        Self {
            store,
            current,
            _subscription: Arc::new(subscription),
        }
    }

    /// The latest snapshot pushed by the store.
    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.current).clone()
    }

    /// The raw token, if logged in.
    pub fn token(&self) -> Option<Token> {
        lock(&self.current).token.clone()
    }

    /// The decoded claims, if logged in.
    pub fn claims(&self) -> Option<Claims> {
        lock(&self.current).claims.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.current).authenticated
    }

    pub fn is_expired(&self) -> bool {
        lock(&self.current).expired
    }

    /// Forwards to [`SessionStore::set`].
    pub fn set_token(&self, token: impl Into<Token>) {
        self.store.set(token);
    }

    /// Forwards to [`SessionStore::clear`].
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("snapshot", &*lock(&self.current))
            .finish_non_exhaustive()
    }
}

/// The [`AuthContext`] of the enclosing [`AuthProvider`] scope.
///
/// # Errors
/// Returns [`SessionError::OutsideProvider`] when called outside of one.
pub fn use_auth() -> Result<AuthContext, SessionError> {
    AUTH.try_with(AuthContext::clone)
        .map_err(|_| SessionError::OutsideProvider)
}

fn lock(snapshot: &Mutex<SessionSnapshot>) -> MutexGuard<'_, SessionSnapshot> {
    snapshot.lock().unwrap_or_else(PoisonError::into_inner)
}

//! The session store: the single owner of the authentication token.
//!
//! The store is responsible for:
//! - Validating a token before adopting it (decode + not expired)
//! - Persisting the raw token so a reload stays logged in
//! - Clearing the session at the exact instant the token expires
//! - Following logins/logouts made by other contexts on the same storage
//! - Telling every subscriber about each change
//!
//! # Concurrency note
//!
//! `set`, `clear`, `hydrate` and `snapshot` are synchronous and never
//! yield. Internal state sits behind a `std::sync::Mutex` that is only
//! held for a few field updates; it is released before storage I/O and
//! before any listener runs, so listeners may call back into the store.
//!
//! Two things happen on their own, each in a spawned tokio task:
//! - the **expiry timer**, a one-shot sleep that clears the session;
//! - the **sync task**, which re-hydrates when another context changes
//!   the persisted token.
//!
//! Their order relative to an explicit `set`/`clear` from the app is not
//! defined. Whichever transition completes last wins, and every path
//! leaves the store either empty or holding claims that were unexpired
//! when adopted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tagdo_storage::Storage;
use tagdo_token::{Token, decode};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::{Clock, SessionConfig, SessionSnapshot, SessionState, SystemClock};

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// The process-wide session state machine.
///
/// `SessionStore` is a cheap handle (an `Arc` inside); clones share the
/// same state. Build one per storage scope, normally through a
/// [`SessionRegistry`](crate::SessionRegistry).
///
/// ## Lifecycle
///
/// ```text
///                set(valid) / hydrate()
///   [Empty] ───────────────────────────────→ [Active] ──┐
///      ↑                                        │        │ set(other valid)
///      │  clear() / timer fires / rejected set  │        │ (timer re-armed)
///      └────────────────────────────────────────┘ ←──────┘
/// ```
///
/// Construction needs a tokio runtime for the expiry timer and the sync
/// task. Without one the store still works, but only `snapshot()`
/// notices expiry and other contexts' changes go unseen.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    key: String,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    core: Mutex<Core>,
}

#[derive(Default)]
struct Core {
    state: SessionState,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
    /// At most one armed timer, by construction.
    timer: Option<ExpiryTimer>,
    next_generation: u64,
    sync_task: Option<AbortHandle>,
    /// Bumped by every notification round. A round that finds it moved
    /// on has been superseded and stops delivering its older snapshot.
    emission: u64,
}

/// A running expiry timer.
///
/// `generation` identifies this particular arming. A timer that wakes up
/// after it was replaced or cancelled sees a different generation (or
/// none) and does nothing.
struct ExpiryTimer {
    generation: u64,
    deadline_ms: i64,
    handle: AbortHandle,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        // Core is only mutated field-by-field, so a poisoned lock still
        // guards a consistent value.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Core {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
            tracing::trace!(generation = timer.generation, "expiry timer cancelled");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        core.cancel_timer();
        if let Some(task) = core.sync_task.take() {
            task.abort();
        }
    }
}

impl SessionStore {
    /// Creates a store persisting under `config.storage_key` in `storage`,
    /// using the system clock.
    ///
    /// Immediately hydrates from storage, arms the expiry timer if a
    /// valid token was found, and starts listening for changes made by
    /// other contexts.
    pub fn new(config: SessionConfig, storage: impl Storage) -> Self {
        Self::with_clock(config, storage, SystemClock)
    }

    /// Like [`new`](Self::new), with an explicit clock.
    pub fn with_clock(
        config: SessionConfig,
        storage: impl Storage,
        clock: impl Clock,
    ) -> Self {
        Self::from_parts(config, Arc::new(storage), Arc::new(clock))
    }

    pub(crate) fn from_parts(
        config: SessionConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Self {
            inner: Arc::new(Inner {
                key: config.storage_key,
                storage,
                clock,
                core: Mutex::new(Core::default()),
            }),
        };

        store.hydrate();
        store.schedule_expiry();
        store.start_sync();

        tracing::info!(
            key = %store.inner.key,
            authenticated = store.snapshot().authenticated,
            "session store ready"
        );
        store
    }

    /// The key the token is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    // =====================================================================
    // Transitions
    // =====================================================================

    /// Adopts `token` as the current session.
    ///
    /// If the token decodes and hasn't expired, the store becomes Active:
    /// the token is persisted, the expiry timer is re-armed for the new
    /// expiry, and subscribers are notified.
    ///
    /// If the token is malformed, incomplete or already expired, the
    /// store is **cleared** instead, even if it held a valid session
    /// before. A rejected `set` is a logout, not a no-op.
    pub fn set(&self, token: impl Into<Token>) {
        let token = token.into();
        let now = self.inner.clock.now_millis();

        let claims = match decode(&token) {
            Ok(claims) if !claims.is_expired_at_millis(now) => claims,
            Ok(claims) => {
                tracing::debug!(
                    user_id = %claims.user_id,
                    exp = claims.exp,
                    now_ms = now,
                    "rejected expired token"
                );
                self.clear();
                return;
            }
            Err(err) => {
                tracing::debug!(%err, "rejected malformed token");
                self.clear();
                return;
            }
        };

        tracing::info!(user_id = %claims.user_id, exp = claims.exp, "session started");
        self.inner.lock().state = SessionState::Active {
            token: token.clone(),
            claims,
        };
        if let Err(err) = self.inner.storage.set(&self.inner.key, &token) {
            tracing::warn!(%err, key = %self.inner.key, "failed to persist session token");
        }
        self.schedule_expiry();
        self.emit();
    }

    /// Logs out: empties the state, removes the persisted token, cancels
    /// the expiry timer and notifies subscribers.
    ///
    /// Safe to call when already empty; storage is still cleaned and
    /// subscribers are still notified.
    pub fn clear(&self) {
        self.reset(None);
    }

    /// Loads the session from storage.
    ///
    /// A missing entry leaves the store empty. An entry that fails to
    /// decode or has expired is removed from storage and the store is
    /// left empty. A valid entry is adopted as-is (it is already
    /// persisted, so it isn't written back).
    ///
    /// Does not touch the timer or notify anyone; see
    /// [`resync`](Self::resync) for the combined operation.
    pub fn hydrate(&self) {
        let stored = match self.inner.storage.get(&self.inner.key) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(
                    %err,
                    key = %self.inner.key,
                    "failed to read persisted session token"
                );
                None
            }
        };

        let next = match stored {
            None => SessionState::Empty,
            Some(token) => {
                let now = self.inner.clock.now_millis();
                match decode(&token) {
                    Ok(claims) if !claims.is_expired_at_millis(now) => {
                        SessionState::Active { token, claims }
                    }
                    Ok(claims) => {
                        tracing::debug!(
                            user_id = %claims.user_id,
                            exp = claims.exp,
                            "discarding expired persisted token"
                        );
                        self.remove_persisted();
                        SessionState::Empty
                    }
                    Err(err) => {
                        tracing::debug!(%err, "discarding malformed persisted token");
                        self.remove_persisted();
                        SessionState::Empty
                    }
                }
            }
        };

        self.inner.lock().state = next;
    }

    /// Re-reads storage, re-arms the expiry timer and notifies
    /// subscribers. This is what runs when another context changes the
    /// persisted token.
    pub fn resync(&self) {
        self.hydrate();
        self.schedule_expiry();
        self.emit();
    }

    /// (Re)arms the expiry timer for the current claims.
    ///
    /// Any previously armed timer is cancelled first. If the store is
    /// empty nothing is armed. If the claims are already past expiry
    /// (clock skew, stale hydration) the store is cleared immediately.
    pub fn schedule_expiry(&self) {
        let mut core = self.inner.lock();
        core.cancel_timer();

        let deadline_ms = match core.state.claims() {
            None => return,
            Some(claims) => claims.expires_at_millis(),
        };
        let delay_ms = deadline_ms
            .saturating_sub(self.inner.clock.now_millis())
            .max(0);

        if delay_ms == 0 {
            drop(core);
            tracing::debug!(deadline_ms, "session already expired when scheduling; clearing");
            self.clear();
            return;
        }

        core.next_generation += 1;
        let generation = core.next_generation;
        let delay = Duration::from_millis(delay_ms.unsigned_abs());

        match self.spawn_timer(generation, delay) {
            Some(handle) => {
                core.timer = Some(ExpiryTimer {
                    generation,
                    deadline_ms,
                    handle,
                });
                tracing::debug!(generation, delay_ms, "expiry timer armed");
            }
            None => tracing::warn!("no tokio runtime; session expiry timer not armed"),
        }
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// The session as of right now.
    ///
    /// Recomputed on every call, so a token that expired a moment ago
    /// reads as not authenticated even if the timer hasn't fired yet.
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.inner.clock.now_millis();
        self.inner.lock().state.snapshot_at(now)
    }

    /// Deadline of the armed expiry timer, in epoch milliseconds.
    ///
    /// `None` when no timer is armed. There is never more than one.
    pub fn expiry_deadline(&self) -> Option<i64> {
        self.inner.lock().timer.as_ref().map(|t| t.deadline_ms)
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    // =====================================================================
    // Subscriptions
    // =====================================================================

    /// Registers `listener` for session changes.
    ///
    /// The listener is called once right away with the current snapshot,
    /// then after every change. Dropping the returned [`Subscription`]
    /// (or calling [`Subscription::unsubscribe`]) removes it without
    /// affecting any other listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let now = self.inner.clock.now_millis();

        let (id, snapshot) = {
            let mut core = self.inner.lock();
            let id = core.next_listener;
            core.next_listener += 1;
            core.listeners.push((id, Arc::clone(&listener)));
            (id, core.state.snapshot_at(now))
        };

        listener(&snapshot);

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Empties the session. With `Some(generation)`, only does so if that
    /// timer is still the armed one.
    fn reset(&self, only_if_timer: Option<u64>) {
        let was_active = {
            let mut core = self.inner.lock();
            if let Some(generation) = only_if_timer {
                let current = core.timer.as_ref().map(|t| t.generation);
                if current != Some(generation) {
                    tracing::trace!(generation, "stale expiry timer ignored");
                    return;
                }
            }
            core.cancel_timer();
            std::mem::take(&mut core.state).is_active()
        };

        self.remove_persisted();

        if was_active {
            tracing::info!(expired = only_if_timer.is_some(), "session cleared");
        } else {
            tracing::debug!("clear on empty session");
        }
        self.emit();
    }

    fn remove_persisted(&self) {
        if let Err(err) = self.inner.storage.remove(&self.inner.key) {
            tracing::warn!(%err, key = %self.inner.key, "failed to remove persisted session token");
        }
    }

    /// Sends the current snapshot to every listener.
    ///
    /// A listener may itself change the session (a `clear` on seeing an
    /// unwanted user, say). That nested change starts a new round which
    /// reaches every listener with the newer snapshot, so this round stops
    /// instead of handing the remaining listeners a stale one afterwards.
    /// The same holds when another thread (the expiry timer) notifies
    /// while this round is still running.
    fn emit(&self) {
        let now = self.inner.clock.now_millis();
        let (round, snapshot, listeners) = {
            let mut core = self.inner.lock();
            core.emission += 1;
            let listeners: Vec<Listener> =
                core.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (core.emission, core.state.snapshot_at(now), listeners)
        };

        tracing::trace!(
            round,
            listeners = listeners.len(),
            authenticated = snapshot.authenticated,
            "session snapshot emitted"
        );
        for listener in listeners {
            if self.inner.lock().emission != round {
                tracing::trace!(round, "notification round superseded");
                return;
            }
            listener(&snapshot);
        }
    }

    fn spawn_timer(&self, generation: u64, delay: Duration) -> Option<AbortHandle> {
        let runtime = Handle::try_current().ok()?;
        let store = Arc::downgrade(&self.inner);

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = store.upgrade() {
                tracing::debug!(generation, "expiry timer fired");
                SessionStore { inner }.reset(Some(generation));
            }
        });
        Some(task.abort_handle())
    }

    fn start_sync(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no tokio runtime; cross-context session sync disabled");
            return;
        };

        let mut events = self.inner.storage.events();
        let store = Arc::downgrade(&self.inner);

        let task = runtime.spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = store.upgrade() else {
                    break;
                };
                if event.key != inner.key {
                    continue;
                }
                tracing::debug!(
                    origin = %event.origin,
                    present = event.new_value.is_some(),
                    "session changed in another context"
                );
                SessionStore { inner }.resync();
            }
        });

        self.inner.lock().sync_task = Some(task.abort_handle());
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.inner.key)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Keeps a listener registered with a [`SessionStore`].
///
/// The listener is removed when this value is dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore` that need no runtime: the pure
    //! transitions. Timer and sync behaviour live in `tests/`.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;
    use tagdo_storage::{MemoryBackend, MemoryStorage};

    use super::*;

    struct Fixed(i64);
    impl Clock for Fixed {
        fn now_millis(&self) -> i64 {
            self.0 * 1000
        }
    }

    const NOW: i64 = 1_700_000_000;

    fn token(user: &str, exp: i64) -> String {
        let payload = json!({ "userId": user, "permissions": 1, "exp": exp });
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        format!("h.{body}.s")
    }

    fn store_on(storage: MemoryStorage) -> SessionStore {
        SessionStore::with_clock(SessionConfig::default(), storage, Fixed(NOW))
    }

    fn persisted(storage: &MemoryStorage) -> Option<String> {
        storage.get(DEFAULT_KEY).unwrap()
    }

    const DEFAULT_KEY: &str = crate::DEFAULT_STORAGE_KEY;

    #[test]
    fn test_set_valid_token_becomes_active() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        let t = token("u-1", NOW + 60);

        store.set(t.clone());

        let snap = store.snapshot();
        assert_eq!(snap.token.as_deref(), Some(t.as_str()));
        assert_eq!(snap.claims.unwrap().user_id, "u-1");
        assert!(snap.authenticated);
        assert!(!snap.expired);
        assert_eq!(persisted(&storage), Some(t));
    }

    #[test]
    fn test_set_malformed_token_is_empty() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));

        store.set("not-a-jwt");

        assert_eq!(store.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn test_set_expired_token_logs_out_existing_session() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        store.set(token("u-1", NOW + 60));

        store.set(token("u-2", NOW));

        assert!(!store.snapshot().authenticated);
        assert_eq!(store.snapshot().token, None);
        assert_eq!(persisted(&storage), None);
    }

    /// Subscribes a listener that records every snapshot it is handed.
    fn record(store: &SessionStore) -> (Subscription, Arc<Mutex<Vec<SessionSnapshot>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |snap| sink.lock().unwrap().push(snap.clone()));
        (sub, seen)
    }

    #[test]
    fn test_set_malformed_token_notifies_logout() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        store.set(token("u-1", NOW + 60));
        let (_sub, seen) = record(&store);

        store.set("not-a-jwt");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "initial call + one for the rejected set");
        assert!(seen[0].authenticated);
        assert_eq!(seen[1], SessionSnapshot::default());
        assert_eq!(persisted(&storage), None);
    }

    #[test]
    fn test_set_expired_token_notifies_logout() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        store.set(token("u-1", NOW + 60));
        let (_sub, seen) = record(&store);

        store.set(token("u-2", NOW - 5));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.last(), Some(&SessionSnapshot::default()));
        assert_eq!(persisted(&storage), None);
    }

    #[test]
    fn test_set_fractional_exp_in_the_future_is_accepted() {
        // Fixed clock sits exactly on NOW; an exp half a second later is
        // still valid.
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));
        let exp = NOW as f64 + 0.5;
        let payload = json!({ "userId": "u", "permissions": 1, "exp": exp });
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());

        store.set(format!("h.{body}.s"));

        assert!(store.snapshot().authenticated);
    }

    #[test]
    fn test_change_made_by_listener_reaches_later_listeners_last() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));
        let guard = store.clone();
        // First listener refuses every login.
        let _veto = store.subscribe(move |snap| {
            if snap.authenticated {
                guard.clear();
            }
        });
        let (_sub, seen) = record(&store);

        store.set(token("u-1", NOW + 60));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&SessionSnapshot::default()));
        assert!(
            seen.iter().all(|snap| !snap.authenticated),
            "stale login delivered after the logout: {seen:?}"
        );
        assert!(!store.snapshot().authenticated);
    }

    #[test]
    fn test_clear_twice_stays_empty_and_notifies_each_time() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        store.set(token("u-1", NOW + 60));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.clear();
        store.clear();

        assert_eq!(store.snapshot(), SessionSnapshot::default());
        assert_eq!(persisted(&storage), None);
        // 1 on subscribe + 1 per clear.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_hydrate_adopts_valid_persisted_token() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let t = token("u-9", NOW + 60);
        storage.set(DEFAULT_KEY, &t).unwrap();

        let store = store_on(storage.clone());

        assert_eq!(store.snapshot().token, Some(t.clone()));
        assert_eq!(persisted(&storage), Some(t));
    }

    #[test]
    fn test_hydrate_discards_expired_persisted_token() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        storage.set(DEFAULT_KEY, &token("u-9", NOW - 1)).unwrap();

        let store = store_on(storage.clone());

        assert!(!store.snapshot().authenticated);
        assert_eq!(persisted(&storage), None, "stale entry removed");
    }

    #[test]
    fn test_hydrate_discards_garbage_persisted_token() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        storage.set(DEFAULT_KEY, "garbage").unwrap();

        let store = store_on(storage.clone());

        assert_eq!(store.snapshot().token, None);
        assert_eq!(persisted(&storage), None);
    }

    #[test]
    fn test_hydrate_does_not_notify() {
        let storage = MemoryStorage::open(MemoryBackend::new());
        let store = store_on(storage.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        storage.set(DEFAULT_KEY, &token("u", NOW + 60)).unwrap();
        store.hydrate();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "only the initial call");
        assert!(store.snapshot().authenticated);
    }

    #[test]
    fn test_subscribe_calls_listener_immediately() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = store.subscribe(move |snap| sink.lock().unwrap().push(snap.clone()));

        assert_eq!(*seen.lock().unwrap(), vec![SessionSnapshot::default()]);
    }

    #[test]
    fn test_unsubscribe_one_keeps_others() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let (ca, cb) = (Arc::clone(&a), Arc::clone(&b));
        let sub_a = store.subscribe(move |_| {
            ca.fetch_add(1, Ordering::SeqCst);
        });
        let _sub_b = store.subscribe(move |_| {
            cb.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.listener_count(), 2);

        sub_a.unsubscribe();
        store.clear();

        assert_eq!(store.listener_count(), 1);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_call_back_into_store() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));
        let reader = store.clone();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let _sub = store.subscribe(move |_| {
            // Would deadlock if the store held its lock while notifying.
            let _ = reader.snapshot();
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.set(token("u", NOW + 60));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_without_runtime_no_timer_is_armed() {
        let store = store_on(MemoryStorage::open(MemoryBackend::new()));

        store.set(token("u", NOW + 60));

        assert!(store.snapshot().authenticated);
        assert_eq!(store.expiry_deadline(), None);
    }
}

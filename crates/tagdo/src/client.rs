//! `Client` builder: one place that owns the session registry and API
//! configuration for an application.

use std::sync::Arc;

use tagdo_session::{AuthProvider, Clock, SessionConfig, SessionRegistry, SessionStore};
use tagdo_storage::Storage;

use crate::{ApiConfig, Guard, Navigation, RequestAuth};

/// Builder for a [`Client`].
///
/// # Example
///
/// ```rust
/// use tagdo::prelude::*;
///
/// let client = Client::builder()
///     .session_config(SessionConfig::with_storage_key("my_app_token"))
///     .build(MemoryStorage::open(MemoryBackend::new()));
///
/// assert_eq!(client.store().storage_key(), "my_app_token");
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    api: ApiConfig,
    session: SessionConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads both configurations from the environment.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            session: SessionConfig::from_env(),
            clock: None,
        }
    }

    /// Sets the API configuration.
    pub fn api_config(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Sets the clock expiry is judged against. Defaults to the system
    /// clock.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Builds the client over `storage`. The session store itself is
    /// built on first use.
    pub fn build(self, storage: impl Storage) -> Client {
        let mut registry = SessionRegistry::new(self.session, storage);
        if let Some(clock) = self.clock {
            registry = registry.with_clock(clock);
        }
        Client {
            api: self.api,
            registry,
        }
    }
}

/// A Tagdo client: API configuration plus the session registry.
pub struct Client {
    api: ApiConfig,
    registry: SessionRegistry,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The session store, built on first access.
    pub fn store(&self) -> &SessionStore {
        self.registry.store()
    }

    /// A provider for [`use_auth`](tagdo_session::use_auth) scopes.
    pub fn provider(&self) -> AuthProvider {
        AuthProvider::new(&self.registry)
    }

    /// What the HTTP layer should hold.
    pub fn request_auth(&self) -> RequestAuth {
        RequestAuth::new(self.store().clone())
    }

    /// Evaluates `guard` for `requested` against the current session.
    pub fn navigate(&self, guard: Guard, requested: &str) -> Navigation {
        guard.evaluate(&self.store().snapshot(), requested)
    }
}

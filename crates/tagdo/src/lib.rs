//! # Tagdo
//!
//! Client core for the Tagdo to-do collaboration app.
//!
//! The interesting part of a Tagdo client is its session: who is logged
//! in, until when, and keeping every part of the app (and every other
//! open window) in agreement about it. This crate wires the layers
//! together and adds the two consumers every client needs:
//!
//! - the **request layer contract** ([`RequestAuth`]): which credential to
//!   attach, and logging out when the server rejects it;
//! - **route guards** ([`Guard`]): where to send a user who is (or isn't)
//!   logged in.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagdo::prelude::*;
//!
//! let client = Client::builder()
//!     .api_config(ApiConfig::new("https://api.example.com/"))
//!     .build(MemoryStorage::open(MemoryBackend::new()));
//!
//! assert_eq!(client.api().url("/api/todos"), "https://api.example.com/api/todos");
//! assert_eq!(
//!     client.navigate(Guard::Protected, "/todos"),
//!     Navigation::Redirect { to: "/login".into(), from: Some("/todos".into()) },
//! );
//! ```

mod client;
mod config;
mod error;
mod guard;
mod http;

pub use client::{Client, ClientBuilder};
pub use config::{API_BASE_URL_ENV, ApiConfig, DEFAULT_API_BASE_URL};
pub use error::TagdoError;
pub use guard::{Guard, HOME_PATH, LOGIN_PATH, Navigation};
pub use http::{
    ApiError, RequestAuth, SESSION_EXPIRED, UNAUTHORIZED, authorization_header, bearer_credential,
    parse_login_response,
};

pub mod prelude {
    //! Everything an application needs in one import.

    pub use crate::{
        ApiConfig, ApiError, Client, ClientBuilder, Guard, Navigation, RequestAuth, TagdoError,
    };
    pub use tagdo_session::{
        AuthContext, AuthProvider, Clock, SessionConfig, SessionRegistry, SessionSnapshot,
        SessionStore, Subscription, SystemClock, use_auth,
    };
    pub use tagdo_storage::{FileBackend, FileStorage, MemoryBackend, MemoryStorage, Storage};
    pub use tagdo_token::{Claims, Token};
}

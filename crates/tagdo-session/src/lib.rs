//! Client-side session lifecycle for Tagdo.
//!
//! This crate owns the logged-in user's token for the whole process:
//!
//! 1. **Store** ([`SessionStore`]) validates and persists the token,
//!    clears it the moment it expires, follows changes made by other
//!    contexts (tabs) sharing the same storage, and pushes a
//!    [`SessionSnapshot`] to every subscriber after each change.
//! 2. **Registry** ([`SessionRegistry`]) builds the one store on first
//!    access and hands the same instance to every consumer.
//! 3. **Facade** ([`AuthProvider`], [`AuthContext`], [`use_auth`]) is
//!    what the rest of the app uses: a binding that mirrors the latest
//!    snapshot and forwards `set_token` / `clear` to the store.
//!
//! # How it fits in the stack
//!
//! ```text
//! Request layer / route guards / UI  ← read snapshots, call set_token/clear
//!     ↕
//! Session layer (this crate)  ← state machine, expiry timer, cross-tab sync
//!     ↕
//! Token codec + Storage (below)  ← decode claims, persist raw token
//! ```

mod binding;
mod clock;
mod config;
mod error;
mod registry;
mod state;
mod store;

pub use binding::{AuthContext, AuthProvider, use_auth};
pub use clock::{Clock, SystemClock, TokioClock};
pub use config::{DEFAULT_STORAGE_KEY, STORAGE_KEY_ENV, SessionConfig};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use state::{SessionSnapshot, SessionState};
pub use store::{SessionStore, Subscription};

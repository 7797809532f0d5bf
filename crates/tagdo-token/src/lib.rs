//! Token decoding for Tagdo.
//!
//! The server hands the client a compact, dot-separated bearer token
//! (`header.payload.signature`). The client never verifies the signature;
//! it only needs to read the payload to learn who is logged in and when
//! the credential stops being valid.
//!
//! - **Codec** ([`decode`], [`is_expired`], [`is_expired_at`]) turns a raw
//!   token into [`Claims`] and answers "is this still usable?".
//! - **Claims** ([`Claims`]) are the normalized identity fields plus every
//!   unrecognized claim, kept as-is.
//! - **Errors** ([`TokenError`]) say which step of decoding rejected the
//!   token.
//!
//! Everything in this crate is pure: no state, no I/O, no clock except the
//! one read by [`is_expired`] when the caller does not supply a time.
//!
//! ```text
//! raw token → decode() → Claims → is_expired_at(now) → bool
//! ```

mod claims;
mod codec;
mod error;

pub use claims::Claims;
pub use codec::{decode, is_expired, is_expired_at, now_epoch_millis, now_epoch_secs};
pub use error::TokenError;

/// A raw bearer token exactly as the server issued it.
pub type Token = String;

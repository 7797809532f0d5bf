//! The decoded identity carried inside a token.

use serde::Serialize;
use serde_json::{Map, Value};

/// Identity and authorization attributes read from a token payload.
///
/// A `Claims` value only exists if decoding succeeded, which means the
/// subject identifier is non-empty and `permissions` and `exp` were
/// valid numbers. There is no way to build a half-valid one through
/// [`decode`](crate::decode).
///
/// Claims the client does not know about are kept in [`extra`](Self::extra)
/// untouched, so a newer server can add fields without older clients
/// silently dropping them.
///
/// Serializes back to a flat JSON object using the wire names
/// (`userId`, `email`, `name`, `surname`, `permissions`, `exp`, `iat`)
/// with the extra claims alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    /// Who the token belongs to. Never empty.
    #[serde(rename = "userId")]
    pub user_id: String,

    /// The user's email address (may be empty if the server omitted it).
    pub email: String,

    /// Given name.
    pub name: String,

    /// Family name.
    pub surname: String,

    /// Permission bitmask / level, exactly as the server sent it.
    pub permissions: f64,

    /// Expiry instant, in seconds since the Unix epoch. May be fractional.
    pub exp: f64,

    /// Issued-at instant, in seconds since the Unix epoch, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,

    /// Every claim that was not one of the fields above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Returns `true` if these claims are no longer valid at `now_secs`.
    ///
    /// Inclusive: a token whose `exp` equals `now_secs` is already expired.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp <= now_secs as f64
    }

    /// Millisecond version of [`is_expired_at`](Self::is_expired_at), for
    /// callers whose clock is finer than a second. A fractional `exp` is
    /// honoured to the millisecond.
    pub fn is_expired_at_millis(&self, now_millis: i64) -> bool {
        self.exp <= now_millis as f64 / 1000.0
    }

    /// The first whole millisecond at which these claims are expired.
    ///
    /// Rounds up, so a timer armed for this instant never fires early.
    /// Expiries beyond the `i64` range saturate.
    pub fn expires_at_millis(&self) -> i64 {
        // `as` saturates for out-of-range floats.
        (self.exp * 1000.0).ceil() as i64
    }

    /// The permission bits, truncated toward zero (saturating).
    pub fn permission_bits(&self) -> i64 {
        self.permissions as i64
    }

    /// Returns `true` if every bit in `mask` is set in the permissions.
    pub fn has_permissions(&self, mask: i64) -> bool {
        self.permission_bits() & mask == mask
    }

    /// Full display name, `"name surname"`, skipping empty parts.
    pub fn display_name(&self) -> String {
        match (self.name.is_empty(), self.surname.is_empty()) {
            (false, false) => format!("{} {}", self.name, self.surname),
            (false, true) => self.name.clone(),
            (true, false) => self.surname.clone(),
            (true, true) => String::new(),
        }
    }

    /// Looks up a claim that was not normalized into a named field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

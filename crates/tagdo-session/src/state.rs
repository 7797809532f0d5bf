//! Session state and the snapshots derived from it.

use serde::Serialize;
use tagdo_token::{Claims, Token};

/// What the store currently holds.
///
/// A token and its claims are set and cleared together, so the state is
/// an enum rather than two independent `Option`s: "token without claims"
/// can't be represented.
///
/// ```text
///   Empty ──(set valid token / hydrate)──→ Active
///     ↑                                      │
///     └──(clear / expiry / rejected set)─────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Logged out.
    #[default]
    Empty,

    /// Logged in with a token that was unexpired when it was adopted.
    Active {
        /// The raw token, exactly as it was set or persisted.
        token: Token,
        /// Claims decoded from `token`.
        claims: Claims,
    },
}

impl SessionState {
    /// The raw token, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Active { token, .. } => Some(token),
        }
    }

    /// The decoded claims, if any.
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Empty => None,
            Self::Active { claims, .. } => Some(claims),
        }
    }

    /// Returns `true` if a token is held (it may have expired since).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Builds the snapshot a consumer would see at `now_millis` (epoch
    /// milliseconds, so a fractional `exp` is judged exactly).
    pub fn snapshot_at(&self, now_millis: i64) -> SessionSnapshot {
        let expired = self
            .claims()
            .is_none_or(|c| c.is_expired_at_millis(now_millis));
        SessionSnapshot {
            token: self.token().map(str::to_owned),
            claims: self.claims().cloned(),
            authenticated: self.is_active() && !expired,
            expired,
        }
    }
}

/// A point-in-time, read-only view of the session.
///
/// Computed fresh on every read, so `expired` is correct even if the
/// expiry timer hasn't fired yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// The raw token, if logged in.
    pub token: Option<Token>,
    /// Decoded claims, if logged in.
    pub claims: Option<Claims>,
    /// A token is held and it hasn't expired.
    pub authenticated: bool,
    /// No claims are held, or they have expired.
    pub expired: bool,
}

impl Default for SessionSnapshot {
    /// The logged-out snapshot.
    fn default() -> Self {
        SessionState::Empty.snapshot_at(0)
    }
}

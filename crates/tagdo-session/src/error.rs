//! Error types for the session layer.

/// Errors surfaced by the session layer.
///
/// Bad, incomplete or expired tokens are *not* errors here: the store
/// absorbs them and simply ends up logged out. What remains are
/// programming mistakes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// [`use_auth`](crate::use_auth) was called outside of an
    /// [`AuthProvider`](crate::AuthProvider) scope.
    #[error("use_auth() must be called within an AuthProvider scope")]
    OutsideProvider,
}

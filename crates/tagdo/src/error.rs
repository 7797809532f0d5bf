//! Unified error type for the Tagdo client.

use tagdo_session::SessionError;
use tagdo_storage::StorageError;
use tagdo_token::TokenError;

use crate::ApiError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TagdoError {
    /// A token could not be decoded.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Durable storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The session facade was misused.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The API answered with an error.
    #[error(transparent)]
    Api(#[from] ApiError),
}

//! Error types for token decoding.

/// Why a token could not be turned into [`Claims`](crate::Claims).
///
/// Callers that only care about "valid or not" can treat every variant
/// the same way. The variants exist so that logs say which step failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token has fewer than two dot-separated segments, so there is
    /// no payload to read.
    #[error("token has {0} segment(s), expected at least 2")]
    MissingPayload(usize),

    /// The payload segment is not valid URL-safe base64.
    #[error("payload is not valid base64url: {0}")]
    Encoding(String),

    /// The decoded payload bytes are not UTF-8 text.
    #[error("payload is not valid UTF-8")]
    Utf8,

    /// The payload text is not JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    /// The payload is JSON, but not a JSON object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// No subject identifier, or an empty one.
    #[error("subject identifier is missing or empty")]
    MissingSubject,

    /// `permissions` is absent or not a number.
    #[error("permissions claim is missing or not a number")]
    InvalidPermissions,

    /// `exp` is absent or not a number.
    #[error("expiry claim is missing or not a number")]
    InvalidExpiry,
}

//! The request layer's side of the session contract.
//!
//! The HTTP client itself lives outside this crate. What it needs from the
//! session is small: the credential to attach to outgoing requests, and a
//! way to log out when the server says that credential is no longer any
//! good.

use serde_json::Value;
use tagdo_session::{SessionSnapshot, SessionStore};
use tagdo_token::Token;

/// `401 Unauthorized`.
pub const UNAUTHORIZED: u16 = 401;

/// `419`, used by the Tagdo API for an expired session.
pub const SESSION_EXPIRED: u16 = 419;

/// An error response from the API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    /// The response body: parsed JSON if it was JSON, otherwise the text.
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            details,
        }
    }

    /// Builds an error from a failed response body.
    fn from_body(status: u16, message: String, body: &str) -> Self {
        let details = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned())))
        };
        Self::new(status, message, details)
    }
}

/// Normalizes a stored token into a bare credential: drops a leading
/// `Bearer ` and any surrounding double quotes.
pub fn bearer_credential(token: &str) -> &str {
    token
        .strip_prefix("Bearer ")
        .unwrap_or(token)
        .trim_matches('"')
}

/// The `Authorization` header value for `snapshot`, if it holds a token.
pub fn authorization_header(snapshot: &SessionSnapshot) -> Option<String> {
    let token = snapshot.token.as_deref()?;
    Some(format!("Bearer {}", bearer_credential(token)))
}

/// Reads the raw token out of a login response.
///
/// The login endpoint answers with the token as the whole body.
///
/// # Errors
/// Returns [`ApiError`] for a non-2xx status or a blank body.
pub fn parse_login_response(status: u16, body: &str) -> Result<Token, ApiError> {
    if !is_success(status) {
        return Err(ApiError::from_body(
            status,
            format!("Login failed ({status})"),
            body,
        ));
    }
    if body.trim().is_empty() {
        return Err(ApiError::new(
            status,
            "Empty token received from server",
            Some(Value::String(body.to_owned())),
        ));
    }
    Ok(body.to_owned())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// What the HTTP client holds to authenticate requests.
#[derive(Debug, Clone)]
pub struct RequestAuth {
    store: SessionStore,
}

impl RequestAuth {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// The `Authorization` header for the next request, if logged in.
    pub fn authorization(&self) -> Option<String> {
        authorization_header(&self.store.snapshot())
    }

    /// Reacts to a response status. Clears the session on
    /// [`UNAUTHORIZED`] or [`SESSION_EXPIRED`] and returns whether it did.
    pub fn on_response_status(&self, status: u16) -> bool {
        if matches!(status, UNAUTHORIZED | SESSION_EXPIRED) {
            tracing::info!(status, "credential rejected by server; clearing session");
            self.store.clear();
            return true;
        }
        false
    }

    /// Checks a finished response: `Ok` for 2xx, otherwise an
    /// [`ApiError`] carrying the body (after clearing the session if the
    /// status calls for it).
    pub fn check_response(&self, status: u16, body: &str) -> Result<(), ApiError> {
        if is_success(status) {
            return Ok(());
        }
        self.on_response_status(status);
        Err(ApiError::from_body(
            status,
            format!("Request failed ({status})"),
            body,
        ))
    }
}

//! Decoding a raw token into [`Claims`] and checking expiry.
//!
//! Decoding is a short pipeline where every step can reject the token:
//!
//! ```text
//! split on '.' → base64url → UTF-8 → JSON → object → normalize → validate
//! ```
//!
//! Normalization is deliberately lenient. Servers in the wild spell the
//! subject field several ways (`userId`, `userID`, `user_id`, `sub`) and
//! sometimes send numbers as strings, so values are coerced to the type
//! the client expects. Validation is strict about the three fields the
//! session cannot live without: subject, permissions and expiry.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

use crate::{Claims, TokenError};

/// URL-safe base64 that accepts the payload with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Keys accepted for the subject identifier, in priority order.
/// After these, any key equal to `userid` ignoring case and underscores
/// is accepted.
const SUBJECT_KEYS: [&str; 3] = ["userId", "userID", "sub"];

/// Decodes the payload segment of `token` into [`Claims`].
///
/// Only the second segment is read. The header and signature are ignored:
/// the client trusts the transport, not the signature.
///
/// # Errors
/// Returns a [`TokenError`] naming the first step that rejected the
/// token. See the module docs for the pipeline.
///
/// # Example
///
/// ```rust
/// use tagdo_token::{decode, TokenError};
///
/// assert_eq!(decode("not-a-jwt"), Err(TokenError::MissingPayload(1)));
///
/// // {"userId":"42","permissions":1,"exp":4102444800}
/// let token = "h.eyJ1c2VySWQiOiI0MiIsInBlcm1pc3Npb25zIjoxLCJleHAiOjQxMDI0NDQ4MDB9.s";
/// let claims = decode(token).unwrap();
/// assert_eq!(claims.user_id, "42");
/// assert_eq!(claims.exp, 4_102_444_800.0);
/// ```
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        return Err(TokenError::MissingPayload(segments.len()));
    }

    let bytes = PAYLOAD_ENGINE
        .decode(segments[1])
        .map_err(|e| TokenError::Encoding(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| TokenError::Utf8)?;
    let parsed: Value =
        serde_json::from_str(&text).map_err(|e| TokenError::Json(e.to_string()))?;

    let Value::Object(raw) = parsed else {
        return Err(TokenError::NotAnObject);
    };

    normalize(raw)
}

/// Returns `true` if `claims` is absent or expired right now.
///
/// Reads the system clock to the millisecond. Use [`is_expired_at`] when
/// the caller has its own notion of "now" (tests, injected clocks).
pub fn is_expired(claims: Option<&Claims>) -> bool {
    let now = now_epoch_millis();
    claims.is_none_or(|c| c.is_expired_at_millis(now))
}

/// Returns `true` if `claims` is absent, or if `claims.exp <= now_secs`.
pub fn is_expired_at(claims: Option<&Claims>, now_secs: i64) -> bool {
    match claims {
        None => true,
        Some(c) => c.is_expired_at(now_secs),
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn now_epoch_secs() -> i64 {
    now_epoch_millis().div_euclid(1000)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_epoch_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        // Clock set before 1970.
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize(mut raw: Map<String, Value>) -> Result<Claims, TokenError> {
    let user_id = take_subject(&mut raw)
        .map(|v| coerce_string(&v))
        .unwrap_or_default();
    if user_id.is_empty() {
        return Err(TokenError::MissingSubject);
    }

    // Kept exactly as sent, fractions and values beyond i64 included.
    let permissions = raw
        .remove("permissions")
        .and_then(|v| coerce_number(&v))
        .ok_or(TokenError::InvalidPermissions)?;

    let exp = raw
        .remove("exp")
        .and_then(|v| coerce_number(&v))
        .ok_or(TokenError::InvalidExpiry)?;

    // A falsy iat (0, "", null, false) counts as absent.
    let iat = raw
        .remove("iat")
        .filter(is_truthy)
        .and_then(|v| coerce_number(&v));

    let email = take_string(&mut raw, "email");
    let name = take_string(&mut raw, "name");
    let surname = take_string(&mut raw, "surname");

    Ok(Claims {
        user_id,
        email,
        name,
        surname,
        permissions,
        exp,
        iat,
        extra: raw,
    })
}

/// Removes and returns the subject identifier under whichever key the
/// server used for it.
fn take_subject(raw: &mut Map<String, Value>) -> Option<Value> {
    for key in SUBJECT_KEYS {
        if let Some(v) = raw.remove(key) {
            return Some(v);
        }
    }

    let alias = raw
        .keys()
        .find(|k| k.replace('_', "").eq_ignore_ascii_case("userid"))
        .cloned()?;
    raw.remove(&alias)
}

fn take_string(raw: &mut Map<String, Value>, key: &str) -> String {
    raw.remove(key).map(|v| coerce_string(&v)).unwrap_or_default()
}

/// String coercion: `null` becomes empty, scalars use their text form,
/// arrays and objects are rendered as JSON.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Numeric coercion: numbers pass through, numeric strings are parsed
/// (blank counts as 0), booleans map to 1/0, `null` maps to 0. Anything
/// else, or a non-finite result, is not a number.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { 0.0 } else { s.parse::<f64>().ok()? }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

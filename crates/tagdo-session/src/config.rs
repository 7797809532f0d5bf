//! Session configuration.

use serde::{Deserialize, Serialize};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "todo_auth_token";

/// Environment variable read by [`SessionConfig::from_env`].
pub const STORAGE_KEY_ENV: &str = "TAGDO_AUTH_STORAGE_KEY";

/// Configuration for the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key the raw token is persisted under. Every context that should
    /// share a login must use the same key.
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl SessionConfig {
    /// Uses `key` as the storage key, or the default if `key` is blank.
    pub fn with_storage_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            storage_key: trimmed.to_owned(),
        }
    }

    /// Reads the storage key from [`STORAGE_KEY_ENV`], falling back to
    /// [`DEFAULT_STORAGE_KEY`] when unset or blank.
    pub fn from_env() -> Self {
        // Unset and non-UTF-8 both land on the default; a blank value is
        // caught by `with_storage_key`.
        std::env::var(STORAGE_KEY_ENV)
            .map(Self::with_storage_key)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_default_key() {
        assert_eq!(SessionConfig::default().storage_key, "todo_auth_token");
    }

    #[test]
    fn test_with_storage_key_trims() {
        assert_eq!(SessionConfig::with_storage_key("  my_key ").storage_key, "my_key");
    }

    #[test]
    fn test_with_storage_key_blank_falls_back() {
        assert_eq!(SessionConfig::with_storage_key("").storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(SessionConfig::with_storage_key("   ").storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_deserialize_missing_field_uses_default() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }
}

//! API endpoint configuration.

use serde::{Deserialize, Serialize};

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7091";

/// Environment variable read by [`ApiConfig::from_env`].
pub const API_BASE_URL_ENV: &str = "TAGDO_API_BASE_URL";

/// Where the Tagdo API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
        }
    }
}

impl ApiConfig {
    /// Normalizes `base_url`: trims whitespace and trailing slashes.
    /// Falls back to [`DEFAULT_API_BASE_URL`] (with a warning) if nothing
    /// is left.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        if trimmed.is_empty() {
            tracing::warn!(fallback = DEFAULT_API_BASE_URL, "API base URL not set; using fallback");
            return Self::default();
        }
        Self {
            base_url: trimmed.to_owned(),
        }
    }

    /// Reads [`API_BASE_URL_ENV`], normalized as in [`new`](Self::new).
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_BASE_URL_ENV).unwrap_or_default())
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

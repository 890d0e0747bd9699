//! Remote backend configuration.
//!
//! # Responsibility
//! - Resolve the catalog server address and request timeout.
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - `base_url` never ends with `/`.
//! - Invalid overrides fall back to defaults instead of failing startup.

use log::warn;
use std::time::Duration;

/// Environment variable overriding the catalog server base URL.
pub const SERVER_URL_ENV: &str = "BOOKSHELF_SERVER_URL";
/// Environment variable overriding the HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "BOOKSHELF_HTTP_TIMEOUT_SECS";

const DEFAULT_SERVER_URL: &str = "http://192.168.0.103:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`crate::remote::http::HttpCatalogSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    /// Creates config for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Builds config from environment overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(SERVER_URL_ENV) {
            let normalized = normalize_base_url(&raw);
            if !normalized.is_empty() {
                config.base_url = normalized;
            }
        }

        if let Some(raw) = lookup(HTTP_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.timeout = Duration::from_secs(secs.min(MAX_TIMEOUT_SECS));
                }
                _ => warn!(
                    "event=config_load module=config status=degraded reason=invalid_timeout key={}",
                    HTTP_TIMEOUT_ENV
                ),
            }
        }

        config
    }

    /// Full URL of one backend endpoint.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/booksAndChapters/{name}", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

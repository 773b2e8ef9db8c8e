use std::env;

use thiserror::Error;
use url::Url;

/// Deck store used when `DECK_STORE_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://www.tang-ping.top/api";

pub const BASE_URL_ENV: &str = "DECK_STORE_BASE_URL";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid deck store URL: {raw}")]
    InvalidBaseUrl { raw: String },
}

/// Where the deck store lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    base_url: Url,
}

impl StoreConfig {
    /// Parse and validate a base URL. Endpoint paths are appended to it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless `raw` is an absolute
    /// http(s) URL.
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidBaseUrl {
            raw: raw.to_owned(),
        };
        let trimmed = raw.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid());
        }
        Ok(Self { base_url })
    }

    /// Read `DECK_STORE_BASE_URL`, falling back to the public store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(BASE_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

//! Remote Store Credentials
//!
//! The remote store is bound by two strings: a project base URL and an
//! access key. Both come from `config.toml` or the `PORTAL_STORE_URL` /
//! `PORTAL_STORE_KEY` env vars. If either is blank the portal runs on
//! the local fallback store instead.

use std::fmt;

use reqwest::RequestBuilder;

/// Base URL + access key for the remote document store.
#[derive(Clone)]
pub struct RemoteCredentials {
    /// Project base URL, without trailing slash.
    base_url: String,
    /// Access key (sent on every request, never logged).
    api_key: String,
}

impl RemoteCredentials {
    /// Build credentials when both values are present and non-blank.
    ///
    /// Returns `None` otherwise, which selects fallback mode.
    pub fn from_parts(url: Option<&str>, key: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|v| !v.is_empty())?;
        let key = key.map(str::trim).filter(|v| !v.is_empty())?;

        Some(Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: key.to_string(),
        })
    }

    /// Project base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach the key as both the `apikey` header and a bearer token.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

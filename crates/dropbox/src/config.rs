//! Client configuration.
//!
//! A [`Config`] carries everything the transport needs: the OAuth access
//! token, the two base URLs the service is split across, and optionally a
//! pre-built HTTP client (for timeouts, proxies, or a custom user agent).
//!
//! ```no_run
//! use dropbox::Config;
//!
//! # fn example() -> Result<(), dropbox::ConfigError> {
//! // From DROPBOX_ACCESS_TOKEN and friends
//! let config = Config::from_env()?;
//!
//! // Or explicitly, e.g. against a local mock
//! let config = Config::new("sl.token")
//!     .with_api_base_url("http://127.0.0.1:8080")?
//!     .with_content_base_url("http://127.0.0.1:8080")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use reqwest::Url;

/// Default host for RPC-style endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://api.dropboxapi.com";

/// Default host for upload and download endpoints.
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://content.dropboxapi.com";

/// Environment variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "DROPBOX_ACCESS_TOKEN";

/// Environment variable overriding [`DEFAULT_API_BASE_URL`].
pub const API_BASE_URL_ENV: &str = "DROPBOX_API_BASE_URL";

/// Environment variable overriding [`DEFAULT_CONTENT_BASE_URL`].
pub const CONTENT_BASE_URL_ENV: &str = "DROPBOX_CONTENT_BASE_URL";

/// Errors raised while building a [`Config`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No access token was supplied.
    #[error("access token not set (expected DROPBOX_ACCESS_TOKEN)")]
    MissingAccessToken,

    /// A base URL could not be parsed.
    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
}

/// Connection settings for [`crate::Client`].
#[derive(Clone)]
pub struct Config {
    pub(crate) access_token: String,
    pub(crate) api_base: Url,
    pub(crate) content_base: Url,
    pub(crate) http: Option<reqwest::Client>,
}

impl Config {
    /// Creates a configuration for the public Dropbox endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: default_url(DEFAULT_API_BASE_URL),
            content_base: default_url(DEFAULT_CONTENT_BASE_URL),
            http: None,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// `DROPBOX_ACCESS_TOKEN` is required; `DROPBOX_API_BASE_URL` and
    /// `DROPBOX_CONTENT_BASE_URL` override the default hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unset or empty, or if an override is
    /// not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(ACCESS_TOKEN_ENV)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;

        let mut config = Self::new(token);
        if let Some(url) = lookup(API_BASE_URL_ENV) {
            config = config.with_api_base_url(&url)?;
        }
        if let Some(url) = lookup(CONTENT_BASE_URL_ENV) {
            config = config.with_content_base_url(&url)?;
        }
        Ok(config)
    }

    /// Overrides the host used for RPC-style endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid absolute URL.
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_url("api_base_url", url)?;
        Ok(self)
    }

    /// Overrides the host used for upload and download.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid absolute URL.
    pub fn with_content_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.content_base = parse_url("content_base_url", url)?;
        Ok(self)
    }

    /// Uses a caller-built HTTP client instead of a default one.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base
    }

    pub fn content_base_url(&self) -> &Url {
        &self.content_base
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("content_base", &self.content_base.as_str())
            .field("http", &self.http.is_some())
            .finish()
    }
}

/// Parses a base URL, normalizing its path to end in `/` so endpoint paths
/// are joined beneath it.
fn parse_url(field: &'static str, url: &str) -> Result<Url, ConfigError> {
    let mut parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: format!("{url}: {e}"),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: format!("{url}: not a base URL"),
        });
    }
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

fn default_url(url: &str) -> Url {
    parse_url("default_base_url", url).expect("default base URL is valid")
}

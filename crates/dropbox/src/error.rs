//! Error types for the Dropbox client.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ConfigError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by [`crate::Files`] and [`crate::Client`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The HTTP request could not be completed (network, DNS, TLS, or a
    /// failure reading the caller's upload stream).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A response body or result header was not the expected JSON.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A listing page reported more entries but gave no cursor to fetch them.
    #[error("{endpoint} reported more entries without a cursor")]
    MissingCursor { endpoint: String },

    /// The request input could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The `Dropbox-API-Arg` header could not be built.
    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    /// The upload body is larger than a single upload request accepts.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the service's `error_summary` when this is a remote API error.
    ///
    /// Summaries look like `path/not_found/..` and are stable enough to match
    /// on with `starts_with`.
    pub fn api_summary(&self) -> Option<&str> {
        match self {
            Self::Api(api) => api.summary.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status when this is a remote API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(api) => Some(api.status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub(crate) fn decode(endpoint: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

/// A non-success response from the service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Dropbox {endpoint} failed: HTTP {status} {}", .summary.as_deref().unwrap_or(&.body))]
pub struct ApiError {
    /// Endpoint that was called, e.g. `/files/get_metadata`.
    pub endpoint: String,
    pub status: StatusCode,
    /// The `error_summary` field of a JSON error payload.
    pub summary: Option<String>,
    /// The structured `error` field of a JSON error payload.
    pub error: Option<serde_json::Value>,
    /// Raw response body.
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error_summary: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ApiError {
    /// Builds an error from a response status and body.
    ///
    /// JSON payloads contribute `error_summary` and `error`; anything else
    /// (the service answers 400s in plain text) is kept only as `body`.
    pub(crate) fn from_response(endpoint: &str, status: StatusCode, body: String) -> Self {
        let (summary, error) = match serde_json::from_str::<ErrorPayload>(&body) {
            Ok(payload) => (payload.error_summary, payload.error),
            Err(_) => (None, None),
        };

        Self {
            endpoint: endpoint.to_string(),
            status,
            summary,
            error,
            body,
        }
    }
}

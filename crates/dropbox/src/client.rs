//! HTTP transport shared by every endpoint.
//!
//! The service exposes two kinds of endpoints:
//! - RPC endpoints on the API host take a JSON body and answer with JSON.
//! - Content endpoints on the content host take their JSON argument in the
//!   `Dropbox-API-Arg` header and stream the file through the request or
//!   response body.

use std::fmt::Write as _;

use reqwest::{
    Url,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    body::UploadBody,
    config::{Config, ConfigError},
    error::{ApiError, Error, Result},
};

/// Request header carrying the JSON argument of a content endpoint.
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Response header carrying the JSON result of a download.
pub const API_RESULT_HEADER: &str = "Dropbox-API-Result";

/// Authenticated connection to the service.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Config,
}

impl Client {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no HTTP client was configured and a default one
    /// cannot be built (e.g. the TLS backend fails to initialize).
    pub fn new(config: Config) -> Result<Self> {
        let http = match &config.http {
            Some(http) => http.clone(),
            None => reqwest::Client::builder().build()?,
        };
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Calls an RPC endpoint, returning the successful response unread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be serialized
    /// - The HTTP request fails to send or receive a response
    /// - The response status code indicates an error (non-2xx)
    #[instrument(skip(self, input), fields(endpoint = %endpoint))]
    pub async fn call<I>(&self, endpoint: &str, input: &I) -> Result<reqwest::Response>
    where
        I: Serialize + ?Sized,
    {
        let url = endpoint_url(&self.config.api_base, endpoint)?;
        let body = serde_json::to_vec(input).map_err(Error::Encode)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        check_status(endpoint, response).await
    }

    /// Calls an RPC endpoint and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be serialized
    /// - The HTTP request fails to send or receive a response
    /// - The response status code indicates an error (non-2xx)
    /// - The response body cannot be decoded as `O`
    pub async fn call_json<I, O>(&self, endpoint: &str, input: &I) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response = self.call(endpoint, input).await?;
        decode_json(endpoint, response).await
    }

    /// Calls a content endpoint.
    ///
    /// `input` is sent in the `Dropbox-API-Arg` header. When `body` is given
    /// it is streamed as the request body; the response body is returned
    /// unread either way.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be serialized into a header value
    /// - The HTTP request fails, including a failure reading `body`
    /// - The response status code indicates an error (non-2xx)
    #[instrument(skip(self, input, body), fields(endpoint = %endpoint))]
    pub async fn call_content<I>(
        &self,
        endpoint: &str,
        input: &I,
        body: Option<UploadBody>,
    ) -> Result<reqwest::Response>
    where
        I: Serialize + ?Sized,
    {
        let url = endpoint_url(&self.config.content_base, endpoint)?;
        let arg = api_arg_header(input)?;

        let mut request = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .header(API_ARG_HEADER, arg);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(body.into_inner());
        }

        let response = request.send().await?;
        check_status(endpoint, response).await
    }
}

/// Reads the whole response and decodes it as JSON. Consuming the response
/// releases the connection.
///
/// # Errors
///
/// Returns an error if the body cannot be read or is not valid JSON for `T`.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::decode(endpoint, e))
}

/// Joins `endpoint` under the base URL's path. Bases always end in `/` (see
/// `Config`), so a prefix like `http://proxy/dropbox/` is kept.
fn endpoint_url(base: &Url, endpoint: &str) -> Result<Url> {
    let relative = format!("2/{}", endpoint.trim_start_matches('/'));
    base.join(&relative).map_err(|e| {
        Error::Config(ConfigError::InvalidUrl {
            field: "endpoint",
            reason: format!("{endpoint}: {e}"),
        })
    })
}

async fn check_status(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        debug!(%status, "request succeeded");
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(%status, error = %e, "failed to read error response body");
            String::new()
        }
    };
    let err = ApiError::from_response(endpoint, status, body);
    warn!(
        %status,
        summary = err.summary.as_deref().unwrap_or_default(),
        "request failed"
    );
    Err(err.into())
}

/// Serializes `input` as JSON that is safe to send in an HTTP header.
///
/// Header values must be ASCII, so every non-ASCII character (and DEL) is
/// written as a `\uXXXX` escape, using surrogate pairs outside the BMP.
/// Non-ASCII characters only occur inside JSON strings, where the escape is
/// equivalent.
pub(crate) fn api_arg_header<I: Serialize + ?Sized>(input: &I) -> Result<HeaderValue> {
    let json = serde_json::to_string(input).map_err(Error::Encode)?;

    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() && c != '\x7f' {
            escaped.push(c);
        } else {
            let mut units = [0_u16; 2];
            for unit in c.encode_utf16(&mut units) {
                // Writing to a String cannot fail.
                let _ = write!(escaped, "\\u{unit:04x}");
            }
        }
    }

    HeaderValue::from_str(&escaped).map_err(|e| Error::InvalidHeader(e.to_string()))
}

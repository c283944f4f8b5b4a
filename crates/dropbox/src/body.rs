//! Streamed request and response bodies for upload and download.

use bytes::Bytes;
use futures::{Stream, TryStream, TryStreamExt};

use crate::error::{Error, Result};

/// Request body for [`crate::Files::upload`].
///
/// Bodies built from in-memory values know their length, which lets the
/// client reject oversized uploads before sending anything. Streams and files
/// are sent chunk by chunk without being buffered.
#[derive(Debug)]
pub struct UploadBody {
    inner: reqwest::Body,
}

impl UploadBody {
    /// Wraps a stream of byte chunks.
    ///
    /// An error yielded by the stream aborts the request and is reported as
    /// [`Error::Transport`].
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: TryStream + Send + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        Self {
            inner: reqwest::Body::wrap_stream(stream),
        }
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }

    /// Size in bytes, when known without reading the body.
    pub fn len(&self) -> Option<u64> {
        self.inner
            .as_bytes()
            .and_then(|bytes| u64::try_from(bytes.len()).ok())
    }

    /// Whether the body is known to be empty.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub(crate) fn into_inner(self) -> reqwest::Body {
        self.inner
    }
}

impl Default for UploadBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for UploadBody {
    fn from(bytes: Bytes) -> Self {
        Self {
            inner: reqwest::Body::from(bytes),
        }
    }
}

impl From<Vec<u8>> for UploadBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for UploadBody {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static str> for UploadBody {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}

impl From<&'static [u8]> for UploadBody {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(bytes))
    }
}

impl From<tokio::fs::File> for UploadBody {
    fn from(file: tokio::fs::File) -> Self {
        Self {
            inner: reqwest::Body::from(file),
        }
    }
}

/// File content returned by [`crate::Files::download`].
///
/// The connection stays open until the stream is read to the end or dropped.
#[derive(Debug)]
pub struct ByteStream {
    response: reqwest::Response,
}

impl ByteStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// The `Content-Length` of the response, if the service sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Reads the next chunk, or `None` at the end of the content.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails mid-body.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }

    /// Reads the remaining content into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails mid-body.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }

    /// Converts into a [`Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        self.response.bytes_stream().map_err(Error::from)
    }
}

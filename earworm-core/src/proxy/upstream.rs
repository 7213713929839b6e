use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// A body relayed chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes, UpstreamError>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UpstreamError(pub String);

/// The headers of an upstream response that are relevant for relaying it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpstreamHeaders {
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub content_range: Option<String>,
    pub accept_ranges: Option<String>,
}

pub struct UpstreamResponse {
    pub status: u16,
    pub headers: UpstreamHeaders,
    /// Dropping the body abandons the upstream request.
    pub body: ByteStream,
}

/// Represents the HTTP client used to fetch audio bytes from a direct URL.
#[async_trait]
pub trait Upstream
where
    Self: 'static + Send + Sync,
{
    /// Sends a GET request to `url`, forwarding `range` verbatim as the `Range` header.
    /// Resolves once the response headers are available.
    async fn fetch(&self, url: &str, range: Option<&str>)
        -> Result<UpstreamResponse, UpstreamError>;
}

/// [Upstream] trait object.
pub type BoxedUpstream = Arc<dyn Upstream>;

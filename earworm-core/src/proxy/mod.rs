mod upstream;

use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

pub use upstream::*;

use crate::{ResolveError, ResolverCache};

/// Upstream statuses that are relayed to the client as they are.
pub const RELAYED_STATUSES: [u16; 3] = [200, 206, 416];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Upstream responded with unsupported status {0}")]
    UpstreamStatus(u16),
}

/// The headers sent along with a proxied stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHeaders {
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub content_range: Option<String>,
    pub accept_ranges: String,
    pub cache_control: &'static str,
}

impl ProxyHeaders {
    /// Direct URLs are short-lived, so nothing in between may cache the response.
    pub const CACHE_CONTROL: &'static str = "no-store";
    pub const DEFAULT_ACCEPT_RANGES: &'static str = "bytes";

    fn from_upstream(headers: UpstreamHeaders) -> Self {
        Self {
            content_type: headers.content_type,
            content_length: headers.content_length,
            content_range: headers.content_range,
            accept_ranges: headers
                .accept_ranges
                .unwrap_or_else(|| Self::DEFAULT_ACCEPT_RANGES.to_string()),
            cache_control: Self::CACHE_CONTROL,
        }
    }

    /// Returns the headers as name/value pairs, skipping the ones upstream did not send.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let optional = [
            ("Content-Type", &self.content_type),
            ("Content-Length", &self.content_length),
            ("Content-Range", &self.content_range),
        ];

        optional
            .into_iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
            .chain([
                ("Accept-Ranges", self.accept_ranges.clone()),
                ("Cache-Control", self.cache_control.to_string()),
            ])
            .collect()
    }
}

/// A response ready to be relayed to the client
pub struct ProxiedStream {
    pub status: u16,
    pub headers: ProxyHeaders,
    pub body: ByteStream,
}

/// Forwards byte-range requests for a media identifier to its direct URL.
///
/// Holds no per-request state, every call is an independent forwarding operation.
pub struct RangeProxy {
    resolver: Arc<ResolverCache>,
    upstream: BoxedUpstream,
}

impl RangeProxy {
    pub fn new(resolver: Arc<ResolverCache>, upstream: BoxedUpstream) -> Self {
        Self { resolver, upstream }
    }

    pub fn resolver(&self) -> &Arc<ResolverCache> {
        &self.resolver
    }

    /// Resolves the media identifier and opens the upstream stream.
    ///
    /// Failures are not retried. They are reported to the resolver instead,
    /// so a stale direct URL gets evicted and resolved again on a later request.
    pub async fn stream(
        &self,
        media_id: &str,
        range: Option<&str>,
    ) -> Result<ProxiedStream, ProxyError> {
        let direct_url = self.resolver.resolve(media_id).await?;

        debug!("Proxying {} with range {:?}", media_id, range);

        let response = match self.upstream.fetch(&direct_url, range).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Upstream request for {} failed: {}", media_id, e);
                self.resolver.report_upstream_failure(media_id);
                return Err(e.into());
            }
        };

        if !RELAYED_STATUSES.contains(&response.status) {
            warn!(
                "Upstream responded with {} for {}",
                response.status, media_id
            );
            self.resolver.report_upstream_failure(media_id);
            return Err(ProxyError::UpstreamStatus(response.status));
        }

        self.resolver.report_upstream_success(media_id);

        Ok(ProxiedStream {
            status: response.status,
            headers: ProxyHeaders::from_upstream(response.headers),
            body: response.body,
        })
    }
}

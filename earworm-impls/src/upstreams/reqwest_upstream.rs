use async_trait::async_trait;
use earworm_core::{Upstream, UpstreamError, UpstreamHeaders, UpstreamResponse};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{
    header::{self, HeaderMap, HeaderName},
    Client,
};

/// An [Upstream] backed by a shared reqwest client.
///
/// The response body is handed over as a stream, so bytes are relayed as they arrive.
#[derive(Clone, Default)]
pub struct ReqwestUpstream {
    client: Client,
}

impl ReqwestUpstream {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Upstream for ReqwestUpstream {
    async fn fetch(
        &self,
        url: &str,
        range: Option<&str>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self.client.get(url);

        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = relayable_headers(response.headers());

        let body = response
            .bytes_stream()
            .map_err(|e| UpstreamError(e.to_string()))
            .boxed();

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

fn relayable_headers(headers: &HeaderMap) -> UpstreamHeaders {
    let get = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    UpstreamHeaders {
        content_type: get(header::CONTENT_TYPE),
        content_length: get(header::CONTENT_LENGTH),
        content_range: get(header::CONTENT_RANGE),
        accept_ranges: get(header::ACCEPT_RANGES),
    }
}

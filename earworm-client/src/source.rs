use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("No video found")]
    NotFound,
    #[error("Invalid server url: {0}")]
    InvalidUrl(String),
}

/// Finds playable media for tracks
#[async_trait]
pub trait StreamSource
where
    Self: 'static + Send + Sync,
{
    /// Looks up a media identifier for a free-text query.
    async fn media_id(&self, query: &str) -> Result<String, SourceError>;

    /// The url the media element should load to play the given media.
    fn stream_url(&self, media_id: &str) -> String;
}

pub type BoxedStreamSource = Arc<dyn StreamSource>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: String,
}

/// Talks to the `/music` endpoints of an earworm server
#[derive(Debug, Clone)]
pub struct HttpStreamSource {
    client: Client,
    base: Url,
}

impl HttpStreamSource {
    pub fn new(client: Client, base: &str) -> Result<Self, SourceError> {
        let base = Url::parse(base).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;

        if base.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(base.to_string()));
        }

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();

        url.set_path(path);
        url.query_pairs_mut().clear().extend_pairs(params);

        url
    }
}

#[async_trait]
impl StreamSource for HttpStreamSource {
    async fn media_id(&self, query: &str) -> Result<String, SourceError> {
        let url = self.endpoint("/music/search", &[("q", query)]);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }

        let found: VideoId = response.error_for_status()?.json().await?;
        Ok(found.video_id)
    }

    fn stream_url(&self, media_id: &str) -> String {
        self.endpoint("/music/stream", &[("id", media_id)]).to_string()
    }
}

#[cfg(test)]
mod test {
    use earworm_core::fakes::serve_once;

    use super::*;

    #[test]
    fn test_stream_url() {
        let source = HttpStreamSource::new(Client::new(), "http://localhost:3333/app/")
            .expect("valid base");

        assert_eq!(
            source.stream_url("dQw4w9WgXcQ"),
            "http://localhost:3333/music/stream?id=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            HttpStreamSource::new(Client::new(), "not a url"),
            Err(SourceError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpStreamSource::new(Client::new(), "mailto:someone@example.com"),
            Err(SourceError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_media_id_searches_server() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 20\r\n\
             Connection: close\r\n\r\n\
             {\"videoId\":\"abc123\"}",
        )
        .await;

        let source = HttpStreamSource::new(Client::new(), &base).expect("valid base");
        let id = source
            .media_id("Aphex Twin Windowlicker")
            .await
            .expect("finds video");

        assert_eq!(id, "abc123");

        let head = request.await.expect("request was captured");
        assert!(head.starts_with("GET /music/search?q=Aphex+Twin+Windowlicker "));
    }

    #[tokio::test]
    async fn test_media_id_not_found() {
        let (base, _) = serve_once(
            "HTTP/1.1 404 Not Found\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 2\r\n\
             Connection: close\r\n\r\n\
             {}",
        )
        .await;

        let source = HttpStreamSource::new(Client::new(), &base).expect("valid base");

        assert!(matches!(
            source.media_id("nothing").await,
            Err(SourceError::NotFound)
        ));
    }
}

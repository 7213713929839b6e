use log::warn;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::CatalogError;

const LYRICS_URL: &str = "https://api.lyrics.ovh/v1";

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    lyrics: Option<String>,
}

/// Looks up lyrics on lyrics.ovh.
pub struct LyricsClient {
    client: Client,
    base: String,
}

impl LyricsClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base: LYRICS_URL.to_string(),
        }
    }

    /// Returns the lyrics for a track, `None` if the service has none.
    ///
    /// An unreachable or failing service counts as having none.
    pub async fn find(&self, artist: &str, title: &str) -> Result<Option<String>, CatalogError> {
        let url = self.lookup_url(artist, title)?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Lyrics lookup for {} - {} failed: {}", artist, title, e);
                return Ok(None);
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                warn!("Lyrics service responded with {} for {} - {}", status, artist, title);
                return Ok(None);
            }
            _ => {}
        }

        let body: LyricsResponse = response.json().await?;

        Ok(body
            .lyrics
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()))
    }

    fn lookup_url(&self, artist: &str, title: &str) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&self.base).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base.clone()))?
            .push(artist.trim())
            .push(title.trim());

        Ok(url)
    }
}

#[cfg(test)]
mod test {
    use earworm_core::fakes::serve_once;
    use tokio::net::TcpListener;

    use super::*;

    fn client_at(base: &str) -> LyricsClient {
        LyricsClient {
            client: Client::new(),
            base: format!("{base}/v1"),
        }
    }

    #[test]
    fn test_lookup_url_escapes_segments() {
        let lyrics = LyricsClient::new(Client::new());

        let url = lyrics
            .lookup_url("AC/DC", " Back in Black ")
            .expect("builds");

        assert_eq!(
            url.as_str(),
            "https://api.lyrics.ovh/v1/AC%2FDC/Back%20in%20Black"
        );
    }

    #[tokio::test]
    async fn test_found_lyrics_are_trimmed() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 25\r\n\
             Connection: close\r\n\r\n\
             {\"lyrics\":\"\\nLa la la\\n\"}",
        )
        .await;

        let lyrics = client_at(&base).find("Artist", "Song").await.expect("looks up");

        assert_eq!(lyrics.as_deref(), Some("La la la"));

        let head = request.await.expect("request was captured");
        assert!(head.starts_with("GET /v1/Artist/Song "));
    }

    #[tokio::test]
    async fn test_failing_service_has_no_lyrics() {
        let (base, _) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;

        let lyrics = client_at(&base).find("Artist", "Song").await;

        assert!(matches!(lyrics, Ok(None)));
    }

    #[tokio::test]
    async fn test_unreachable_service_has_no_lyrics() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("binds");
        let address = listener.local_addr().expect("has address");
        drop(listener);

        let lyrics = client_at(&format!("http://{}", address))
            .find("Artist", "Song")
            .await;

        assert!(matches!(lyrics, Ok(None)));
    }
}

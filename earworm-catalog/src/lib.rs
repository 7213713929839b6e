mod cover;
mod lyrics;
mod providers;

use std::sync::Arc;

use earworm_core::{BoxedToolRunner, Config, ToolError, TrackDescriptor};
use log::warn;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

pub use cover::*;
pub use lyrics::*;
pub use providers::*;

/// Search results looked through for a playable video, since some entries carry no id
const FIRST_VIDEO_CANDIDATES: usize = 5;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search tool failed: {0}")]
    Tool(#[from] ToolError),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// The aggregated response of a metadata search
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResults {
    pub result_count: usize,
    pub results: Vec<TrackDescriptor>,
}

impl MetaResults {
    fn new(results: Vec<TrackDescriptor>) -> Self {
        Self {
            result_count: results.len(),
            results,
        }
    }
}

/// Looks up everything around a track that isn't the audio itself.
pub struct Catalog {
    music: BoxedSearchProvider,
    videos: BoxedSearchProvider,
    lyrics: LyricsClient,
    client: Client,
    limit: usize,
}

impl Catalog {
    /// Creates a catalog backed by iTunes and the resolution tool's YouTube search.
    pub fn new(config: &Config, tool: BoxedToolRunner) -> Self {
        Self::with_providers(
            config,
            Arc::new(ItunesSearch::new(Client::new())),
            Arc::new(YouTubeSearch::new(tool)),
        )
    }

    pub fn with_providers(
        config: &Config,
        music: BoxedSearchProvider,
        videos: BoxedSearchProvider,
    ) -> Self {
        let client = Client::new();

        Self {
            music,
            videos,
            lyrics: LyricsClient::new(client.clone()),
            client,
            limit: config.search_limit,
        }
    }

    /// Searches both providers at the same time.
    /// A failing provider contributes no results, music results come first.
    pub async fn meta(&self, query: &str) -> MetaResults {
        let (music, videos) = tokio::join!(
            self.music.search(query, self.limit),
            self.videos.search(query, self.limit)
        );

        let results = [(self.music.name(), music), (self.videos.name(), videos)]
            .into_iter()
            .flat_map(|(name, result)| match result {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!("{} search for {:?} failed: {}", name, query, e);
                    vec![]
                }
            })
            .collect();

        MetaResults::new(results)
    }

    /// Returns the media identifier of the first video matching the query.
    pub async fn first_video(&self, query: &str) -> Result<Option<String>, CatalogError> {
        let results = self.videos.search(query, FIRST_VIDEO_CANDIDATES).await?;

        Ok(results.into_iter().find_map(|t| t.media_id))
    }

    /// Fetches cover art through the server.
    pub async fn cover(&self, url: &str) -> Result<Cover, CatalogError> {
        fetch_cover(&self.client, url).await
    }

    /// Returns the lyrics for a track, or `None` if there are none.
    pub async fn lyrics(&self, artist: &str, title: &str) -> Result<Option<String>, CatalogError> {
        self.lyrics.find(artist, title).await
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;

    use super::*;

    struct StaticProvider {
        name: &'static str,
        tracks: Option<Vec<TrackDescriptor>>,
    }

    #[async_trait]
    impl SearchProvider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<TrackDescriptor>, CatalogError> {
            match &self.tracks {
                Some(tracks) => Ok(tracks.iter().take(limit).cloned().collect()),
                None => Err(CatalogError::Parse("bad response".to_string())),
            }
        }
    }

    fn catalog(music: Option<Vec<TrackDescriptor>>, videos: Option<Vec<TrackDescriptor>>) -> Catalog {
        Catalog::with_providers(
            &Config::default(),
            Arc::new(StaticProvider {
                name: "music",
                tracks: music,
            }),
            Arc::new(StaticProvider {
                name: "videos",
                tracks: videos,
            }),
        )
    }

    fn video(id: &str) -> TrackDescriptor {
        TrackDescriptor::new(id, "Video", "Channel").with_media_id(id)
    }

    #[tokio::test]
    async fn test_meta_puts_music_first() {
        let catalog = catalog(
            Some(vec![TrackDescriptor::new("1", "Song", "Artist")]),
            Some(vec![video("a"), video("b")]),
        );

        let meta = catalog.meta("song").await;

        assert_eq!(meta.result_count, 3);
        assert_eq!(meta.results[0].id, "1");
        assert_eq!(meta.results[1].id, "a");
    }

    #[tokio::test]
    async fn test_meta_degrades_when_a_provider_fails() {
        let degraded = catalog(None, Some(vec![video("a")]));

        let meta = degraded.meta("song").await;

        assert_eq!(meta.result_count, 1);
        assert_eq!(meta.results[0].media_id.as_deref(), Some("a"));

        let nothing = catalog(None, None).meta("song").await;
        assert_eq!(nothing.result_count, 0);
    }

    #[tokio::test]
    async fn test_first_video() {
        let found = catalog(None, Some(vec![video("a"), video("b")]));
        assert_eq!(found.first_video("q").await.expect("searches"), Some("a".to_string()));

        let empty = catalog(None, Some(vec![]));
        assert_eq!(empty.first_video("q").await.expect("searches"), None);

        let failing = catalog(None, None);
        assert!(failing.first_video("q").await.is_err());
    }

    #[tokio::test]
    async fn test_first_video_skips_entries_without_id() {
        let channel = TrackDescriptor::new("channel", "A channel", "Someone");
        let found = catalog(None, Some(vec![channel.clone(), channel, video("c")]));

        assert_eq!(found.first_video("q").await.expect("searches"), Some("c".to_string()));
    }

    #[test]
    fn test_meta_wire_format() {
        let meta = MetaResults::new(vec![]);
        let json = serde_json::to_value(&meta).expect("serializes");

        assert_eq!(json, serde_json::json!({ "resultCount": 0, "results": [] }));
    }
}

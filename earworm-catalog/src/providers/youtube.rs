use async_trait::async_trait;
use earworm_core::{BoxedToolRunner, TrackDescriptor};
use serde::Deserialize;

use super::SearchProvider;
use crate::CatalogError;

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
    width: Option<u32>,
}

/// A search entry as printed by yt-dlp with `--flat-playlist`
#[derive(Debug, Deserialize)]
struct FlatVideo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct SearchPlaylist {
    #[serde(default)]
    entries: Vec<FlatVideo>,
}

/// Video search through the resolution tool's `ytsearch` extractor.
pub struct YouTubeSearch {
    tool: BoxedToolRunner,
}

impl YouTubeSearch {
    pub fn new(tool: BoxedToolRunner) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl SearchProvider for YouTubeSearch {
    fn name(&self) -> &'static str {
        "YouTube"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let args = [
            format!("ytsearch{}:{}", limit, query),
            // Don't resolve the individual videos.
            "--flat-playlist".to_string(),
            "--skip-download".to_string(),
            // A single JSON document for the whole result set.
            "-J".to_string(),
        ];

        let output = self.tool.run(&args).await?;
        let playlist: SearchPlaylist =
            serde_json::from_str(&output).map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(playlist
            .entries
            .into_iter()
            // Deleted and private videos come without a title.
            .filter(|v| v.title.is_some())
            .take(limit)
            .map(Into::into)
            .collect())
    }
}

impl From<FlatVideo> for TrackDescriptor {
    fn from(video: FlatVideo) -> Self {
        let artwork = best_thumbnail(&video);
        let artist = video.channel.or(video.uploader).unwrap_or_default();

        let mut track =
            TrackDescriptor::new(&video.id, video.title.unwrap_or_default(), artist);

        track.media_id = Some(video.id);
        track.collection = Some("YouTube".to_string());
        track.source = Some("youtube".to_string());
        track.duration_ms = video
            .duration
            .filter(|d| d.is_finite() && *d >= 0.)
            .map(|d| (d * 1000.).round() as u64);
        track.artwork_small = Some(artwork.clone());
        track.artwork = Some(artwork);

        track
    }
}

fn best_thumbnail(video: &FlatVideo) -> String {
    video
        .thumbnails
        .iter()
        .max_by_key(|t| t.width.unwrap_or_default())
        .map(|t| t.url.clone())
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video.id))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use earworm_core::{fakes::FakeTool, ToolError};

    use super::*;

    const SEARCH_OUTPUT: &str = r#"{
        "_type": "playlist",
        "entries": [
            {
                "id": "dQw4w9WgXcQ",
                "title": "Never Gonna Give You Up",
                "channel": "Rick Astley",
                "duration": 212.0,
                "thumbnails": [
                    { "url": "https://i.ytimg.com/small.jpg", "width": 168 },
                    { "url": "https://i.ytimg.com/large.jpg", "width": 336 }
                ]
            },
            { "id": "gone", "title": null, "duration": null },
            { "id": "abc", "title": "Live", "uploader": "Someone" }
        ]
    }"#;

    #[tokio::test]
    async fn test_search_maps_entries() {
        let search = YouTubeSearch::new(Arc::new(FakeTool::succeeding(SEARCH_OUTPUT)));

        let tracks = search.search("rick", 15).await.expect("searches");

        assert_eq!(tracks.len(), 2);

        let first = &tracks[0];
        assert_eq!(first.id, "dQw4w9WgXcQ");
        assert_eq!(first.media_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(first.artist, "Rick Astley");
        assert_eq!(first.collection.as_deref(), Some("YouTube"));
        assert_eq!(first.source.as_deref(), Some("youtube"));
        assert_eq!(first.duration_ms, Some(212_000));
        assert_eq!(first.artwork.as_deref(), Some("https://i.ytimg.com/large.jpg"));

        let second = &tracks[1];
        assert_eq!(second.artist, "Someone");
        assert_eq!(second.duration_ms, None);
        assert_eq!(
            second.artwork.as_deref(),
            Some("https://i.ytimg.com/vi/abc/hqdefault.jpg")
        );
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let search = YouTubeSearch::new(Arc::new(FakeTool::succeeding(SEARCH_OUTPUT)));

        let tracks = search.search("rick", 1).await.expect("searches");

        assert_eq!(tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_failure() {
        let search = YouTubeSearch::new(Arc::new(FakeTool::failing(ToolError::Exit {
            tool: "yt-dlp".to_string(),
            code: Some(1),
            stderr: "ERROR".to_string(),
        })));

        assert!(matches!(
            search.search("rick", 15).await,
            Err(CatalogError::Tool(_))
        ));
    }
}

//! All response bodies that are exposed from endpoints are defined here

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoId {
    pub video_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Lyrics {
    pub lyrics: String,
}

/// A track as returned by the metadata search
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub artwork_url100: Option<String>,
    pub artwork_url60: Option<String>,
    pub collection_name: Option<String>,
    pub track_time_millis: Option<u64>,
    pub video_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaResults {
    pub result_count: usize,
    pub results: Vec<Track>,
}

impl From<earworm_core::TrackDescriptor> for Track {
    fn from(track: earworm_core::TrackDescriptor) -> Self {
        Self {
            track_id: track.id,
            track_name: track.title,
            artist_name: track.artist,
            artwork_url100: track.artwork,
            artwork_url60: track.artwork_small,
            collection_name: track.collection,
            track_time_millis: track.duration_ms,
            video_id: track.media_id,
            source: track.source,
        }
    }
}

impl From<earworm_catalog::MetaResults> for MetaResults {
    fn from(meta: earworm_catalog::MetaResults) -> Self {
        Self {
            result_count: meta.result_count,
            results: meta.results.into_iter().map(Into::into).collect(),
        }
    }
}

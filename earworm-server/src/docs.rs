use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{
    music, serialized::{ErrorBody, Lyrics, MetaResults, Track, VideoId}, streaming,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        music::meta,
        music::search,
        music::cover,
        music::lyrics,
        streaming::stream_track
    ),
    components(schemas(ErrorBody, Lyrics, MetaResults, Track, VideoId)),
    tags(
        (name = "music", description = "Track search and metadata"),
        (name = "streaming", description = "Range-respecting audio streams")
    ),
    info(description = "earworm-server resolves and streams audio for tracks")
)]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

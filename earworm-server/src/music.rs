use axum::{
    body::Body,
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::Response,
    routing::get,
    Json,
};

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{CoverQuery, LyricsQuery, SearchQuery, ValidatedQuery},
    serialized::{ErrorBody, Lyrics, MetaResults, VideoId},
    Router,
};

const COVER_CACHE_CONTROL: &str = "public, max-age=86400";

#[utoipa::path(
    get,
    path = "/music/meta",
    tag = "music",
    params(SearchQuery),
    responses(
        (status = 200, body = MetaResults),
        (status = 400, body = ErrorBody)
    )
)]
pub(crate) async fn meta(
    State(context): State<ServerContext>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Json<MetaResults> {
    let results = context.catalog.meta(&query.q).await;

    Json(results.into())
}

#[utoipa::path(
    get,
    path = "/music/search",
    tag = "music",
    params(SearchQuery),
    responses(
        (status = 200, body = VideoId),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub(crate) async fn search(
    State(context): State<ServerContext>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ServerResult<Json<VideoId>> {
    let video_id = context
        .catalog
        .first_video(&query.q)
        .await?
        .ok_or(ServerError::NoResults)?;

    Ok(Json(VideoId { video_id }))
}

#[utoipa::path(
    get,
    path = "/music/cover",
    tag = "music",
    params(CoverQuery),
    responses(
        (status = 200, content_type = "image/jpeg", description = "The image, cacheable for a day"),
        (status = 400, body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub(crate) async fn cover(
    State(context): State<ServerContext>,
    ValidatedQuery(query): ValidatedQuery<CoverQuery>,
) -> ServerResult<Response<Body>> {
    let cover = context.catalog.cover(&query.url).await?;

    let mut builder = Response::builder()
        .status(200)
        .header(CACHE_CONTROL, COVER_CACHE_CONTROL);

    if let Some(content_type) = cover.content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from(cover.bytes))
        .map_err(|e| ServerError::Unknown(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/music/lyrics",
    tag = "music",
    params(LyricsQuery),
    responses(
        (status = 200, body = Lyrics),
        (status = 404, body = ErrorBody)
    )
)]
pub(crate) async fn lyrics(
    State(context): State<ServerContext>,
    ValidatedQuery(query): ValidatedQuery<LyricsQuery>,
) -> ServerResult<Json<Lyrics>> {
    let lyrics = context
        .catalog
        .lyrics(&query.artist, &query.title)
        .await?
        .ok_or(ServerError::NoResults)?;

    Ok(Json(Lyrics { lyrics }))
}

pub fn router() -> Router {
    Router::new()
        .route("/meta", get(meta))
        .route("/search", get(search))
        .route("/cover", get(cover))
        .route("/lyrics", get(lyrics))
}

use axum::{
    body::Body,
    extract::State,
    http::{header::RANGE, HeaderMap},
    response::Response,
    routing::get,
};

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{StreamQuery, ValidatedQuery},
    serialized::ErrorBody,
    Router,
};

#[utoipa::path(
    get,
    path = "/music/stream",
    tag = "streaming",
    params(StreamQuery),
    responses(
        (status = 200, content_type = "audio/mp4", description = "The full audio stream"),
        (status = 206, content_type = "audio/mp4", description = "The requested byte range"),
        (status = 416, description = "The requested range can't be satisfied"),
        (status = 400, body = ErrorBody, description = "Missing identifier or resolver unavailable"),
        (status = 500, body = ErrorBody, description = "The identifier could not be resolved"),
        (status = 502, body = ErrorBody, description = "The upstream request failed")
    )
)]
pub(crate) async fn stream_track(
    State(context): State<ServerContext>,
    headers: HeaderMap,
    ValidatedQuery(query): ValidatedQuery<StreamQuery>,
) -> ServerResult<Response<Body>> {
    let range = headers.get(RANGE).and_then(|v| v.to_str().ok());
    let stream = context.proxy.stream(&query.id, range).await?;

    let builder = stream
        .headers
        .pairs()
        .into_iter()
        .fold(Response::builder().status(stream.status), |b, (name, value)| {
            b.header(name, value)
        });

    builder
        .body(Body::from_stream(stream.body))
        .map_err(|e| ServerError::Unknown(e.to_string()))
}

pub fn router() -> Router {
    Router::new().route("/stream", get(stream_track))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use earworm_core::{
        fakes::{FakeTool, FakeUpstream},
        ToolError, UpstreamHeaders,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::testing::{read_json, stream_app};

    fn partial_upstream() -> Arc<FakeUpstream> {
        FakeUpstream::new(
            206,
            UpstreamHeaders {
                content_type: Some("audio/mp4".to_string()),
                content_length: Some("11".to_string()),
                content_range: Some("bytes 1000-1010/5000".to_string()),
                accept_ranges: Some("bytes".to_string()),
            },
            vec!["hello ", "world"],
        )
    }

    #[tokio::test]
    async fn test_range_request_is_relayed() {
        let upstream = partial_upstream();
        let router = stream_app(FakeTool::succeeding("https://cdn.example/a"), upstream.clone(), true)
            .await
            .router();

        let response = router
            .oneshot(
                Request::get("/music/stream?id=dQw4w9WgXcQ")
                    .header("Range", "bytes=1000-1999")
                    .body(Body::empty())
                    .expect("builds request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

        let headers = response.headers();
        assert_eq!(headers["content-range"], "bytes 1000-1010/5000");
        assert_eq!(headers["content-type"], "audio/mp4");
        assert_eq!(headers["accept-ranges"], "bytes");
        assert_eq!(headers["cache-control"], "no-store");

        let body = response.into_body().collect().await.expect("reads body").to_bytes();
        assert_eq!(&body[..], b"hello world");

        assert_eq!(
            upstream.requests.lock()[0].1.as_deref(),
            Some("bytes=1000-1999")
        );
    }

    #[tokio::test]
    async fn test_missing_id_is_rejected() {
        let upstream = partial_upstream();
        let router = stream_app(FakeTool::succeeding("https://cdn.example/a"), upstream.clone(), true)
            .await
            .router();

        let response = router
            .oneshot(Request::get("/music/stream").body(Body::empty()).expect("builds request"))
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(upstream.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_resolver_is_a_bad_request() {
        let upstream = partial_upstream();
        let router = stream_app(FakeTool::succeeding("https://cdn.example/a"), upstream.clone(), false)
            .await
            .router();

        let response = router
            .oneshot(Request::get("/music/stream?id=abc").body(Body::empty()).expect("builds request"))
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Unavailable");
        assert_eq!(upstream.request_count(), 0);
    }

    #[tokio::test]
    async fn test_tool_failure_is_a_server_error() {
        let upstream = partial_upstream();
        let tool = FakeTool::failing(ToolError::Exit {
            tool: "yt-dlp".to_string(),
            code: Some(1),
            stderr: "ERROR: Video unavailable".to_string(),
        });
        let router = stream_app(tool, upstream.clone(), true).await.router();

        let response = router
            .oneshot(Request::get("/music/stream?id=abc").body(Body::empty()).expect("builds request"))
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream.request_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_upstream_is_a_bad_gateway() {
        let upstream = FakeUpstream::new(403, UpstreamHeaders::default(), vec![]);
        let router = stream_app(FakeTool::succeeding("https://cdn.example/a"), upstream, true)
            .await
            .router();

        let response = router
            .oneshot(Request::get("/music/stream?id=abc").body(Body::empty()).expect("builds request"))
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}

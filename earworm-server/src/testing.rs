//! Helpers shared by the router tests.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use axum::{body::Body, response::Response};
use earworm_catalog::{CatalogError, Catalog, SearchProvider};
use earworm_core::{
    fakes::{FakeTool, FakeUpstream},
    Config, RangeProxy, ResolverCache, TrackDescriptor, UpstreamHeaders,
};
use http_body_util::BodyExt;

use crate::ServerContext;

/// A provider answering every search with the same tracks, or failing when there are none.
struct StaticProvider(Option<Vec<TrackDescriptor>>);

#[async_trait]
impl SearchProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn search(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, CatalogError> {
        match &self.0 {
            Some(tracks) => Ok(tracks.iter().take(limit).cloned().collect()),
            None => Err(CatalogError::Parse("provider is down".to_string())),
        }
    }
}

pub struct TestApp {
    pub context: ServerContext,
    pub public_dir: PathBuf,
}

impl TestApp {
    pub fn router(&self) -> axum::Router {
        crate::router(self.context.clone(), &self.public_dir)
    }
}

/// An app whose catalog is backed by the given search results.
pub async fn catalog_app(
    music: Option<Vec<TrackDescriptor>>,
    videos: Option<Vec<TrackDescriptor>>,
) -> TestApp {
    let upstream = FakeUpstream::new(200, UpstreamHeaders::default(), vec![]);
    let catalog = Catalog::with_providers(
        &Config::default(),
        Arc::new(StaticProvider(music)),
        Arc::new(StaticProvider(videos)),
    );

    build(FakeTool::succeeding(""), upstream, catalog, true).await
}

/// An app whose streams come from the given tool and upstream.
pub async fn stream_app(tool: FakeTool, upstream: Arc<FakeUpstream>, warm_up: bool) -> TestApp {
    let catalog = Catalog::with_providers(
        &Config::default(),
        Arc::new(StaticProvider(Some(vec![]))),
        Arc::new(StaticProvider(Some(vec![]))),
    );

    build(tool, upstream, catalog, warm_up).await
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("reads body")
        .to_bytes();

    serde_json::from_slice(&body).expect("body is json")
}

async fn build(
    tool: FakeTool,
    upstream: Arc<FakeUpstream>,
    catalog: Catalog,
    warm_up: bool,
) -> TestApp {
    let resolver = Arc::new(ResolverCache::new(&Config::default(), Arc::new(tool)));

    if warm_up {
        resolver.warm_up().await;
    }

    TestApp {
        context: ServerContext::new(RangeProxy::new(resolver, upstream), catalog),
        public_dir: public_dir(),
    }
}

/// Creates a fresh directory holding a minimal client.
fn public_dir() -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let dir = std::env::temp_dir().join(format!(
        "earworm-public-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    std::fs::create_dir_all(&dir).expect("creates public dir");
    std::fs::write(dir.join("index.html"), "<title>earworm</title>").expect("writes index");

    dir
}

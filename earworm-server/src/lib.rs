use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use axum::routing::get;
use log::{info, warn};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

mod context;
mod docs;
mod errors;
mod music;
mod schemas;
mod serialized;
mod streaming;

#[cfg(test)]
mod testing;

pub use context::*;
pub use errors::*;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 3333;

/// The default directory the client assets are served from.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

pub type Router = axum::Router<ServerContext>;

/// Where and what the server serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub public_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `EARWORM_SERVER_PORT` and `EARWORM_PUBLIC_DIR`, falling back to the defaults.
    pub fn from_env() -> Self {
        let port = match env::var("EARWORM_SERVER_PORT") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid port {:?}", value);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let public_dir = env::var("EARWORM_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PUBLIC_DIR));

        Self { port, public_dir }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

/// Builds the application router.
/// Paths that match neither an endpoint nor a file get the client's `index.html`.
pub fn router(context: ServerContext, public_dir: &Path) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets =
        ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    let music_router = music::router().merge(streaming::router());

    Router::new()
        .nest("/music", music_router)
        .route("/api.json", get(docs::docs))
        .fallback_service(assets)
        .layer(cors)
        .with_state(context)
}

/// Starts the earworm server
pub async fn run_server(context: ServerContext, config: ServerConfig) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, config.port).into();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on http://localhost:{}", config.port);
    info!("Serving assets from {}", config.public_dir.display());

    axum::serve(listener, router(context, &config.public_dir)).await
}

use std::path::{Component, Path};

use earworm_core::Config;
use futures_util::StreamExt;
use log::info;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

const RELEASE_URL: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download";

#[derive(Debug, Error)]
pub enum ToolDownloadError {
    #[error("Failed to download the resolution tool: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to write the resolution tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads the latest yt-dlp release to [Config::tool_path] if it is missing.
///
/// Bare names like `yt-dlp` are left to the `PATH` lookup and never downloaded.
/// The default path is `./yt-dlp`, so a fresh install fetches the tool on first start.
/// Returns true if a download took place.
pub async fn ensure_tool(config: &Config) -> Result<bool, ToolDownloadError> {
    let path = config.tool_path.as_path();

    if !config.auto_download_tool || is_bare_name(path) || path.exists() {
        return Ok(false);
    }

    let url = format!("{}/{}", RELEASE_URL, release_asset());
    info!("Downloading {} to {}", url, path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let response = reqwest::get(&url).await?.error_for_status()?;
    let mut body = response.bytes_stream();

    // Written next to the target first, so an interrupted download never looks like a binary.
    let partial = path.with_extension("part");
    let mut file = fs::File::create(&partial).await?;

    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }

    file.flush().await?;
    drop(file);

    mark_executable(&partial).await?;
    fs::rename(&partial, path).await?;

    info!("Resolution tool downloaded");
    Ok(true)
}

fn is_bare_name(path: &Path) -> bool {
    let mut components = path.components();

    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn release_asset() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else {
        "yt-dlp"
    }
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

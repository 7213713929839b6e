use log::warn;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// How the external resolution tool is executed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Wait for the process to exit and collect its output in one go.
    #[default]
    Output,
    /// Read stdout and stderr incrementally while the process is running.
    Streamed,
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "output" => Ok(Self::Output),
            "streamed" | "stream" => Ok(Self::Streamed),
            other => Err(format!("unknown exec mode {other}")),
        }
    }
}

/// The configuration of the resolution and proxy layer
#[derive(Debug, Clone)]
pub struct Config {
    /// Name or path of the yt-dlp binary
    pub tool_path: PathBuf,
    /// Which process strategy runs the tool
    pub exec_mode: ExecMode,
    /// Whether the tool is downloaded when `tool_path` points at a missing file
    pub auto_download_tool: bool,
    /// The page handed to the tool, `{id}` is replaced by the media identifier
    pub watch_url_template: String,
    /// The format selector passed to the tool
    pub audio_format: String,
    /// How long a resolved direct URL may be served from the cache
    pub direct_url_ttl: Duration,
    /// How long a single tool invocation may run before it is killed
    pub tool_timeout: Duration,
    /// How many consecutive upstream failures evict a cached direct URL
    pub upstream_failure_threshold: u32,
    /// Maximum amount of results requested from each search provider
    pub search_limit: usize,
}

impl Config {
    /// Returns the page URL for a media identifier
    pub fn watch_url(&self, media_id: &str) -> String {
        self.watch_url_template.replace("{id}", media_id)
    }

    /// Returns the tool arguments that print the direct audio URL of a media identifier
    pub fn resolution_args(&self, media_id: &str) -> Vec<String> {
        vec![
            self.watch_url(media_id),
            "-f".to_string(),
            self.audio_format.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-g".to_string(),
        ]
    }

    /// Builds a config from the defaults, overridden by `EARWORM_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = parse_env::<PathBuf>("EARWORM_TOOL_PATH") {
            config.tool_path = path;
        }

        if let Some(mode) = parse_env("EARWORM_TOOL_MODE") {
            config.exec_mode = mode;
        }

        if let Some(download) = parse_env("EARWORM_TOOL_AUTO_DOWNLOAD") {
            config.auto_download_tool = download;
        }

        if let Some(format) = parse_env("EARWORM_AUDIO_FORMAT") {
            config.audio_format = format;
        }

        if let Some(secs) = parse_env("EARWORM_URL_TTL_SECS") {
            config.direct_url_ttl = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_env("EARWORM_TOOL_TIMEOUT_SECS") {
            config.tool_timeout = Duration::from_secs(secs);
        }

        if let Some(limit) = parse_env("EARWORM_SEARCH_LIMIT") {
            config.search_limit = limit;
        }

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        // A path next to the working directory, so a missing tool can be downloaded there.
        let tool_name = if cfg!(windows) {
            "./yt-dlp.exe"
        } else {
            "./yt-dlp"
        };

        Self {
            tool_path: PathBuf::from(tool_name),
            exec_mode: ExecMode::default(),
            auto_download_tool: true,
            watch_url_template: "https://www.youtube.com/watch?v={id}".to_string(),
            audio_format: "bestaudio[ext=m4a]/bestaudio[ext=mp4]/bestaudio".to_string(),
            // Direct URLs stay valid for hours, but they are tied to the requesting IP and
            // occasionally revoked early.
            direct_url_ttl: Duration::from_secs(5 * 60),
            tool_timeout: Duration::from_secs(30),
            upstream_failure_threshold: 2,
            search_limit: 15,
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;

    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring invalid value {:?} for {}", value, key);
            None
        }
    }
}

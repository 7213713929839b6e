use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use earworm_core::{ToolError, ToolRunner};
use log::debug;
use tokio::process::Command;

use super::{exit_error, spawn_error};

/// Runs the tool to completion and collects its output in one go.
pub struct OutputTool {
    path: PathBuf,
}

impl OutputTool {
    pub fn new<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ToolRunner for OutputTool {
    async fn run(&self, args: &[String]) -> Result<String, ToolError> {
        debug!("Running {} {:?}", self.path.display(), args);

        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| spawn_error(&self.path, e))?;

        if !output.status.success() {
            return Err(exit_error(
                &self.path,
                output.status.code(),
                &output.stderr,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_collects_stdout() {
        let tool = OutputTool::new("sh");

        let output = tool
            .run(&sh("echo '[info] working'; echo https://cdn.example/a"))
            .await
            .expect("runs");

        assert_eq!(output, "[info] working\nhttps://cdn.example/a\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let tool = OutputTool::new("sh");

        let result = tool.run(&sh("echo 'Video unavailable' >&2; exit 1")).await;

        assert_eq!(
            result,
            Err(ToolError::Exit {
                tool: "sh".to_string(),
                code: Some(1),
                stderr: "Video unavailable".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_spawn() {
        let tool = OutputTool::new("/nonexistent/yt-dlp");

        assert!(!tool.probe().await);
        assert!(matches!(
            tool.run(&[]).await,
            Err(ToolError::Spawn { .. })
        ));
    }
}

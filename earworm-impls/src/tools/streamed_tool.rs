use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use earworm_core::{ToolError, ToolRunner};
use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};

use super::{exit_error, io_error, spawn_error};

/// Spawns the tool and reads stdout and stderr while it is running.
///
/// Both pipes are drained concurrently, so a chatty stderr can't stall the process.
pub struct StreamedTool {
    path: PathBuf,
}

impl StreamedTool {
    pub fn new<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn missing_pipe(&self, name: &str) -> ToolError {
        io_error(
            &self.path,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, format!("{name} not captured")),
        )
    }
}

#[async_trait]
impl ToolRunner for StreamedTool {
    async fn run(&self, args: &[String]) -> Result<String, ToolError> {
        debug!("Spawning {} {:?}", self.path.display(), args);

        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.path, e))?;

        let stdout = child.stdout.take().ok_or_else(|| self.missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| self.missing_pipe("stderr"))?;

        let (output, error_output) = tokio::try_join!(drain(stdout), drain(stderr))
            .map_err(|e| io_error(&self.path, e))?;

        let status = child.wait().await.map_err(|e| io_error(&self.path, e))?;

        if !status.success() {
            return Err(exit_error(&self.path, status.code(), &error_output));
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

async fn drain<R>(mut pipe: R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(buf)
}

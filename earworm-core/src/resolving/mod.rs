mod cache;
mod output;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use cache::*;
pub use output::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Failed to launch {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with {code:?}: {stderr}")]
    Exit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to read output of {tool}: {message}")]
    Io { tool: String, message: String },
}

/// Represents a way of invoking the external resolution tool.
///
/// Implementors decide how the process is run, callers only see its text output.
#[async_trait]
pub trait ToolRunner
where
    Self: 'static + Send + Sync,
{
    /// Runs the tool with the given arguments, returning what it wrote to stdout.
    /// A non-zero exit is an error.
    async fn run(&self, args: &[String]) -> Result<String, ToolError>;

    /// Returns true if the tool can be executed at all.
    async fn probe(&self) -> bool {
        self.run(&["--version".to_string()]).await.is_ok()
    }
}

/// [ToolRunner] trait object.
pub type BoxedToolRunner = Arc<dyn ToolRunner>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Resolver is not available")]
    Unavailable,

    #[error("Resolution tool failed: {0}")]
    ToolFailed(#[from] ToolError),

    #[error("Resolution tool produced no direct URL for {0}")]
    NoDirectUrl(String),

    #[error("Resolution of {0} was aborted")]
    Aborted(String),

    #[error("Resolution tool timed out for {0}")]
    TimedOut(String),
}

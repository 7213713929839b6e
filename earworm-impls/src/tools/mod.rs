mod output_tool;
mod streamed_tool;
mod tool_download;

use std::{path::Path, sync::Arc};

use earworm_core::{BoxedToolRunner, Config, ExecMode, ToolError};

pub use output_tool::*;
pub use streamed_tool::*;
pub use tool_download::*;

/// Creates the tool runner selected by [Config::exec_mode].
pub fn tool_runner(config: &Config) -> BoxedToolRunner {
    match config.exec_mode {
        ExecMode::Output => Arc::new(OutputTool::new(&config.tool_path)),
        ExecMode::Streamed => Arc::new(StreamedTool::new(&config.tool_path)),
    }
}

fn tool_name(path: &Path) -> String {
    path.display().to_string()
}

fn spawn_error(path: &Path, error: std::io::Error) -> ToolError {
    ToolError::Spawn {
        tool: tool_name(path),
        message: error.to_string(),
    }
}

fn io_error(path: &Path, error: std::io::Error) -> ToolError {
    ToolError::Io {
        tool: tool_name(path),
        message: error.to_string(),
    }
}

fn exit_error(path: &Path, code: Option<i32>, stderr: &[u8]) -> ToolError {
    ToolError::Exit {
        tool: tool_name(path),
        code,
        stderr: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}

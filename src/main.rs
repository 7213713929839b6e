use std::sync::Arc;

use colored::Colorize;
use earworm_catalog::Catalog;
use earworm_core::{Config, RangeProxy, ResolverCache};
use earworm_impls::{ensure_tool, tool_runner, ReqwestUpstream};
use earworm_server::{run_server, ServerConfig, ServerContext};
use log::{error, info, warn};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

mod logging;

struct Earworm {
    context: ServerContext,
    server_config: ServerConfig,
    runtime: Runtime,
}

#[derive(Debug, Error)]
enum EarwormError {
    #[error("Could not build the async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Server stopped: {0}")]
    Server(std::io::Error),
}

impl Earworm {
    fn new() -> Result<Self, EarwormError> {
        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("earworm-async")
            .build()
            .map_err(EarwormError::Runtime)?;

        let config = Config::from_env();
        let server_config = ServerConfig::from_env();

        let context = runtime.block_on(async {
            match ensure_tool(&config).await {
                Ok(true) => info!("Downloaded {}", config.tool_path.display()),
                Ok(false) => {}
                Err(e) => warn!("Could not download the resolution tool: {}", e),
            }

            let tool = tool_runner(&config);
            let resolver = Arc::new(ResolverCache::new(&config, tool.clone()));
            resolver.warm_up().await;

            let proxy = RangeProxy::new(resolver, Arc::new(ReqwestUpstream::default()));
            let catalog = Catalog::new(&config, tool);

            ServerContext::new(proxy, catalog)
        });

        Ok(Self {
            context,
            server_config,
            runtime,
        })
    }

    fn run(self) -> Result<(), EarwormError> {
        self.runtime
            .block_on(run_server(self.context, self.server_config))
            .map_err(EarwormError::Server)
    }
}

impl EarwormError {
    fn hint(&self) -> String {
        match self {
            EarwormError::Runtime(_) => "The operating system refused to start the worker threads.".to_string(),
            EarwormError::Server(_) => "Make sure EARWORM_SERVER_PORT is free and the public directory is readable, then try again.".to_string(),
        }
    }
}

fn main() {
    if let Err(e) = logging::init_logger() {
        eprintln!("Could not initialize logging: {}", e);
    }

    let result = Earworm::new().and_then(|earworm| {
        info!("Initialized successfully.");
        earworm.run()
    });

    if let Err(error) = result {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "Earworm stopped!".bold().red()
        );
        error!("{}", error);
        error!(
            "{}",
            format!("Hint: {}", error.hint()).dimmed().italic()
        );
    }
}

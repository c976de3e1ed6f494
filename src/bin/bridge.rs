//! Headless host bridge.
//!
//! Serves the line-delimited JSON protocol from `tetromino::adapter` until the
//! listener fails or the process receives Ctrl-C.

use anyhow::Result;
use tracing::{info, Level};

use tetromino::adapter::{run_server, ServerConfig};
use tetromino::logging::{self, LogConfig, LogTarget};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&LogConfig::from_env(Level::INFO, LogTarget::Stderr))?;

    let config = ServerConfig::from_env();
    info!(host = %config.host, port = config.port, "starting host bridge");

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    }
}

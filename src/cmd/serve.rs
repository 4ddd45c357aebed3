//! Realtime server command: `boardsync serve`.

use std::path::PathBuf;

use anyhow::Result;
use boardsync::config::BoardsyncConfig;

/// Flags that take precedence over the file and environment.
#[derive(Debug, Default, Clone)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_path: Option<PathBuf>,
    pub dev: bool,
}

pub async fn cmd_serve(config: &BoardsyncConfig, overrides: ServeOverrides) -> Result<()> {
    for warning in config.validate() {
        tracing::warn!(%warning, "configuration warning");
    }

    let mut server = config.server_config();
    if let Some(host) = overrides.host {
        server.host = host;
    }
    if let Some(port) = overrides.port {
        server.port = port;
    }
    if let Some(db_path) = overrides.db_path {
        server.db_path = db_path;
    }
    server.dev_mode |= overrides.dev;

    boardsync::server::start_server(server).await
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::api::{self, AppState, SharedState};
use super::db::{BoardDb, DbHandle};
use super::hub::{DEFAULT_TOPIC_CAPACITY, TopicHub};
use super::ws::{self, KeepAlive};

/// Configuration for the realtime server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
    pub channel_capacity: usize,
    pub keepalive: KeepAlive,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3141,
            db_path: PathBuf::from(".boardsync/boardsync.db"),
            dev_mode: false,
            channel_capacity: DEFAULT_TOPIC_CAPACITY,
            keepalive: KeepAlive::default(),
        }
    }
}

/// Build the full application router with the HTTP API and the socket.
pub fn build_router(state: SharedState) -> Router {
    api::api_router()
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the database at `db_path`, creating its directory if needed.
pub fn open_db(db_path: &std::path::Path) -> Result<BoardDb> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    BoardDb::new(db_path).context("Failed to initialize board database")
}

/// Start the server and run until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let db = open_db(&config.db_path)?;
    let state = AppState::new(
        DbHandle::new(db),
        TopicHub::new(config.channel_capacity),
        config.keepalive,
    );

    let mut app = build_router(state);
    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(%local_addr, db = %config.db_path.display(), "boardsync listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

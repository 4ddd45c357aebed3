//! Workspace setup command: `boardsync init`.

use std::path::Path;

use anyhow::Result;
use boardsync::config::BoardsyncConfig;

/// Write a default `boardsync.toml` if absent and create the database.
pub fn cmd_init(config_path: &Path, config: &BoardsyncConfig) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        BoardsyncConfig::default().save(config_path)?;
        println!("Created {}", config_path.display());
    }

    let db_path = &config.server.db_path;
    boardsync::server::open_db(db_path)?;
    tracing::info!(db = %db_path.display(), "database initialized");
    println!("Database initialized at {}", db_path.display());
    println!();
    println!("Next: boardsync board create <name> && boardsync serve");
    Ok(())
}

//! Configuration view and validation commands: `boardsync config`.

use std::path::Path;

use anyhow::Result;
use boardsync::config::BoardsyncConfig;

use super::super::ConfigCommands;

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Boardsync Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No config file at {} (using defaults)", config_path.display());
            }
            println!();

            let config = super::load_config(config_path)?;
            print_config(&config);

            if !config_path.exists() {
                println!("Run 'boardsync config init' to create a boardsync.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No boardsync.toml found. Using defaults (valid).");
                return Ok(());
            }

            let config = BoardsyncConfig::load(config_path)?;
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("boardsync.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            BoardsyncConfig::default().save(config_path)?;

            println!("Created boardsync.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port, db_path, dev_mode");
            println!("  - [realtime] channel_capacity, ping_interval_secs, pong_timeout_secs");
            println!("  - [logging] level, format, directory");
            println!();
        }
    }

    Ok(())
}

fn print_config(config: &BoardsyncConfig) {
    println!("Effective values (with env overrides):");
    println!("[server]");
    println!("  host = \"{}\"", config.server.host);
    println!("  port = {}", config.server.port);
    println!("  db_path = \"{}\"", config.server.db_path.display());
    println!("  dev_mode = {}", config.server.dev_mode);
    println!();
    println!("[realtime]");
    println!("  channel_capacity = {}", config.realtime.channel_capacity);
    println!("  ping_interval_secs = {}", config.realtime.ping_interval_secs);
    println!("  pong_timeout_secs = {}", config.realtime.pong_timeout_secs);
    println!();
    println!("[logging]");
    println!("  level = \"{}\"", config.logging.level);
    println!("  format = \"{}\"", config.logging.format);
    if let Some(dir) = &config.logging.directory {
        println!("  directory = \"{}\"", dir.display());
    }
    println!();
}

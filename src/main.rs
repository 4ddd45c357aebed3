use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "boardsync")]
#[command(version, about = "Realtime drag-and-drop board sync server")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to boardsync.toml (defaults to ./boardsync.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and realtime socket server
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Enable dev mode (CORS permissive for a separately served front-end)
        #[arg(long)]
        dev: bool,
    },
    /// Create a default boardsync.toml and initialize the database
    Init,
    /// Create or list boards
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    /// Create a new board
    Create { name: String },
    /// List all boards
    List,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default boardsync.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(boardsync::config::DEFAULT_CONFIG_FILE));

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&config_path, command.clone());
    }

    let config = cmd::load_config(&config_path)?;
    let _log_guard = boardsync::logging::init_tracing(&config.logging, cli.verbose)?;

    match &cli.command {
        Commands::Serve {
            port,
            host,
            db_path,
            dev,
        } => {
            let overrides = cmd::ServeOverrides {
                host: host.clone(),
                port: *port,
                db_path: db_path.clone(),
                dev: *dev,
            };
            cmd::cmd_serve(&config, overrides).await?;
        }
        Commands::Init => cmd::cmd_init(&config_path, &config)?,
        Commands::Board { command } => cmd::cmd_board(&config, command.clone())?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

//! Configuration for boardsync.
//!
//! Reads `boardsync.toml` and layers overrides on top of it
//! (file → environment → CLI). Every key has a default, so an empty or
//! missing file is a valid configuration.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3141
//! db_path = ".boardsync/boardsync.db"
//! dev_mode = false
//!
//! [realtime]
//! channel_capacity = 256
//! ping_interval_secs = 30
//! pong_timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! directory = ".boardsync/logs"
//! ```
//!
//! # Environment Overrides
//!
//! | Variable               | Key               |
//! |------------------------|-------------------|
//! | `BOARDSYNC_HOST`       | `server.host`     |
//! | `BOARDSYNC_PORT`       | `server.port`     |
//! | `BOARDSYNC_DB_PATH`    | `server.db_path`  |
//! | `BOARDSYNC_LOG`        | `logging.level`   |
//! | `BOARDSYNC_LOG_FORMAT` | `logging.format`  |

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::server::ServerConfig;
use crate::server::ws::KeepAlive;

pub const DEFAULT_CONFIG_FILE: &str = "boardsync.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Permissive CORS for a separately served front-end
    #[serde(default)]
    pub dev_mode: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            dev_mode: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3141
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".boardsync/boardsync.db")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSection {
    /// Per-topic broadcast buffer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_pong_timeout_secs")]
    pub pong_timeout_secs: u64,
}

impl Default for RealtimeSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            ping_interval_secs: default_ping_interval_secs(),
            pong_timeout_secs: default_pong_timeout_secs(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_ping_interval_secs() -> u64 {
    30
}

fn default_pong_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `tracing` filter directive, e.g. `info` or `boardsync=debug,tower_http=info`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level `boardsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardsyncConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub realtime: RealtimeSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl BoardsyncConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse boardsync.toml")
    }

    /// Load `path`, or defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize boardsync.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `BOARDSYNC_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BOARDSYNC_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("BOARDSYNC_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid BOARDSYNC_PORT '{}'", port))?;
        }
        if let Some(path) = lookup("BOARDSYNC_DB_PATH") {
            self.server.db_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("BOARDSYNC_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("BOARDSYNC_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; the OS will pick a random port".to_string());
        }
        if self.server.dev_mode && self.server.host != "127.0.0.1" && self.server.host != "localhost" {
            warnings.push(format!(
                "dev_mode enables permissive CORS while listening on '{}'",
                self.server.host
            ));
        }
        if self.realtime.channel_capacity < 16 {
            warnings.push(format!(
                "realtime.channel_capacity {} is very small; subscribers will often need to resync",
                self.realtime.channel_capacity
            ));
        }
        if self.realtime.ping_interval_secs == 0 {
            warnings.push("realtime.ping_interval_secs must be greater than 0".to_string());
        }
        if self.realtime.pong_timeout_secs <= self.realtime.ping_interval_secs {
            warnings.push(format!(
                "realtime.pong_timeout_secs ({}) should exceed ping_interval_secs ({})",
                self.realtime.pong_timeout_secs, self.realtime.ping_interval_secs
            ));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            warnings.push(format!("Invalid logging.level '{}'", self.logging.level));
        }

        warnings
    }

    pub fn keepalive(&self) -> KeepAlive {
        KeepAlive {
            ping_interval: Duration::from_secs(self.realtime.ping_interval_secs.max(1)),
            pong_timeout: Duration::from_secs(self.realtime.pong_timeout_secs),
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            db_path: self.server.db_path.clone(),
            dev_mode: self.server.dev_mode,
            channel_capacity: self.realtime.channel_capacity,
            keepalive: self.keepalive(),
        }
    }
}

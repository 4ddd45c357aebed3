//! CLI command implementations.
//!
//! | Module   | Commands handled      |
//! |----------|-----------------------|
//! | `serve`  | `Serve`               |
//! | `init`   | `Init`                |
//! | `board`  | `Board`               |
//! | `config` | `Config`              |

pub mod board;
pub mod config;
pub mod init;
pub mod serve;

pub use board::cmd_board;
pub use config::cmd_config;
pub use init::cmd_init;
pub use serve::{ServeOverrides, cmd_serve};

use std::path::Path;

use anyhow::Result;
use boardsync::config::BoardsyncConfig;

/// Load `boardsync.toml` (or defaults) and apply `BOARDSYNC_*` overrides.
pub fn load_config(path: &Path) -> Result<BoardsyncConfig> {
    let mut config = BoardsyncConfig::load_or_default(path)?;
    config.apply_env()?;
    Ok(config)
}

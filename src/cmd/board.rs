//! Board management commands: `boardsync board`.

use anyhow::Result;
use boardsync::config::BoardsyncConfig;

use super::super::BoardCommands;

pub fn cmd_board(config: &BoardsyncConfig, command: BoardCommands) -> Result<()> {
    let db = boardsync::server::open_db(&config.server.db_path)?;

    match command {
        BoardCommands::Create { name } => {
            let board = db.create_board(&name)?;
            tracing::info!(uid = %board.uid, "board created");
            println!("Created board '{}' ({})", board.title, board.uid);
        }
        BoardCommands::List => {
            let boards = db.list_boards()?;
            if boards.is_empty() {
                println!("No boards yet. Run 'boardsync board create <name>'.");
            }
            for board in boards {
                println!("{}  {}", board.uid, board.title);
            }
        }
    }

    Ok(())
}

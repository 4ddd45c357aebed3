//! Integration tests for the boardsync CLI.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a boardsync Command isolated from the caller's environment
fn boardsync() -> Command {
    let mut cmd = cargo_bin_cmd!("boardsync");
    for var in [
        "BOARDSYNC_HOST",
        "BOARDSYNC_PORT",
        "BOARDSYNC_DB_PATH",
        "BOARDSYNC_LOG",
        "BOARDSYNC_LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_boardsync_help() {
        boardsync()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("board"));
    }

    #[test]
    fn test_boardsync_version() {
        boardsync().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        boardsync().arg("frobnicate").assert().failure();
    }

    #[test]
    fn test_init_creates_config_and_database() {
        let dir = create_temp_project();

        boardsync()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created boardsync.toml"))
            .stdout(predicate::str::contains("Database initialized"));

        assert!(dir.path().join("boardsync.toml").exists());
        assert!(dir.path().join(".boardsync/boardsync.db").exists());
    }

    #[test]
    fn test_init_idempotent() {
        let dir = create_temp_project();
        boardsync().current_dir(dir.path()).arg("init").assert().success();

        boardsync()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }
}

// =============================================================================
// Board Commands
// =============================================================================

mod boards {
    use super::*;

    #[test]
    fn test_board_create_then_list() {
        let dir = create_temp_project();

        boardsync()
            .current_dir(dir.path())
            .args(["board", "create", "Roadmap"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created board 'Roadmap'"));

        boardsync()
            .current_dir(dir.path())
            .args(["board", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Roadmap"));
    }

    #[test]
    fn test_board_list_empty() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .args(["board", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No boards yet"));
    }

    #[test]
    fn test_board_create_honours_db_path_env() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .env("BOARDSYNC_DB_PATH", "data/custom.db")
            .args(["board", "create", "Elsewhere"])
            .assert()
            .success();

        assert!(dir.path().join("data/custom.db").exists());
        assert!(!dir.path().join(".boardsync/boardsync.db").exists());
    }

    #[test]
    fn test_board_create_requires_name() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .args(["board", "create"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Config Commands
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("using defaults"))
            .stdout(predicate::str::contains("port = 3141"));
    }

    #[test]
    fn test_config_show_applies_env_override() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .env("BOARDSYNC_PORT", "9999")
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 9999"));
    }

    #[test]
    fn test_config_init_creates_toml() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created boardsync.toml"));

        let content = fs::read_to_string(dir.path().join("boardsync.toml")).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[realtime]"));
    }

    #[test]
    fn test_config_validate_no_config() {
        let dir = create_temp_project();
        boardsync()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Using defaults"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("boardsync.toml"),
            "[realtime]\nchannel_capacity = 2\n",
        )
        .unwrap();

        boardsync()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("channel_capacity"));
    }

    #[test]
    fn test_config_validate_rejects_malformed_toml() {
        let dir = create_temp_project();
        fs::write(dir.path().join("boardsync.toml"), "[server\nport = 1\n").unwrap();

        boardsync()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse"));
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = create_temp_project();
        fs::write(dir.path().join("alt.toml"), "[server]\nport = 7070\n").unwrap();

        boardsync()
            .current_dir(dir.path())
            .args(["--config", "alt.toml", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 7070"));
    }
}

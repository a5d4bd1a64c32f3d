//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would need a game log).

use std::path::PathBuf;

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "hunter")]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    #[arg(long, env = "HUNTER_API_KEY")]
    api_key: Option<String>,

    #[arg(long, env = "HUNTER_REPORT_URL")]
    report_url: Option<String>,

    #[arg(long, env = "HUNTER_HISTORY_URL")]
    history_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    Tail {
        #[arg(long)]
        handle: Option<String>,
    },
    Backup {
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        #[arg(long)]
        handle: Option<String>,
        #[arg(long)]
        user_id: String,
        #[arg(short, long)]
        quiet: bool,
        #[arg(long)]
        json: bool,
    },
}

#[test]
fn test_parse_no_args() {
    let args = Args::try_parse_from(["hunter"]).unwrap();
    assert!(args.command.is_none());
    assert!(args.config.is_none());
    assert!(args.log.is_none());
}

#[test]
fn test_parse_tail_with_handle() {
    let args = Args::try_parse_from(["hunter", "tail", "--handle", "DocHound"]).unwrap();
    match args.command {
        Some(Command::Tail { handle }) => {
            assert_eq!(handle.as_deref(), Some("DocHound"));
        }
        _ => panic!("Expected Tail command"),
    }
}

#[test]
fn test_parse_backup_defaults() {
    let args = Args::try_parse_from(["hunter", "backup", "--user-id", "42"]).unwrap();
    match args.command {
        Some(Command::Backup {
            dir,
            handle,
            user_id,
            quiet,
            json,
        }) => {
            assert!(dir.is_none());
            assert!(handle.is_none());
            assert_eq!(user_id, "42");
            assert!(!quiet);
            assert!(!json);
        }
        _ => panic!("Expected Backup command"),
    }
}

#[test]
fn test_parse_backup_full() {
    let args = Args::try_parse_from([
        "hunter",
        "backup",
        "--dir",
        "logbackups",
        "--handle",
        "DocHound",
        "--user-id",
        "42",
        "-q",
        "--json",
    ])
    .unwrap();
    match args.command {
        Some(Command::Backup {
            dir, quiet, json, ..
        }) => {
            assert_eq!(dir, Some(PathBuf::from("logbackups")));
            assert!(quiet);
            assert!(json);
        }
        _ => panic!("Expected Backup command"),
    }
}

#[test]
fn test_backup_requires_user_id() {
    let result = Args::try_parse_from(["hunter", "backup"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_global_options() {
    let args = Args::try_parse_from([
        "hunter",
        "--config",
        "hunter.toml",
        "--log",
        "Game.log",
        "--api-key",
        "secret",
        "--report-url",
        "https://example.invalid/report",
        "tail",
    ])
    .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("hunter.toml")));
    assert_eq!(args.log, Some(PathBuf::from("Game.log")));
    assert_eq!(args.api_key.as_deref(), Some("secret"));
    assert_eq!(
        args.report_url.as_deref(),
        Some("https://example.invalid/report")
    );
    assert!(matches!(args.command, Some(Command::Tail { .. })));
}

#[test]
fn test_invalid_command_fails() {
    let result = Args::try_parse_from(["hunter", "invalid-command"]);
    assert!(result.is_err());
}

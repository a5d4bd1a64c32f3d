//! CLI argument definitions for hunter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hunter")]
#[command(about = "Game log kill tracker", version)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the game log (defaults to Game.log in or above the current directory)
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Servitor API key
    #[arg(long, env = "HUNTER_API_KEY")]
    pub api_key: Option<String>,

    /// Kill report endpoint
    #[arg(long, env = "HUNTER_REPORT_URL")]
    pub report_url: Option<String>,

    /// Kill history endpoint
    #[arg(long, env = "HUNTER_HISTORY_URL")]
    pub history_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Follow the game log and report kills (default)
    Tail {
        /// Player handle (read from the log when omitted)
        #[arg(long)]
        handle: Option<String>,
    },
    /// Replay archived logs and upload kills Servitor has not recorded
    Backup {
        /// Backup directory (defaults to logbackups next to the game log)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Player handle (read from the game log when omitted)
        #[arg(long)]
        handle: Option<String>,
        /// Servitor user id whose history is used for deduplication
        #[arg(long)]
        user_id: String,
        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

//! CLI command implementations.

pub mod backup;
pub mod tail;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};
use hunter_core::export::format_status_console;
use hunter_core::{find_game_log, find_player_handle, Config, SharedCredential, StatusSink};
use tracing::{debug, info};

use crate::cli::Args;

const CONFIG_DIR: &str = "hunter";
const CONFIG_FILE: &str = "config.toml";
const HANDLE_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Settings shared by every command
pub struct Context {
    pub config: Config,
    pub credentials: SharedCredential,
    pub log: Option<PathBuf>,
}

impl Context {
    pub fn from_args(args: &Args) -> Result<Self> {
        let path = args.config.clone().or_else(default_config_path);
        let mut config = match &path {
            Some(path) => Config::load_or_default(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };
        debug!("Config: {:?}", path);

        if let Some(url) = &args.report_url {
            config.servitor.report_url = url.clone();
        }
        if let Some(url) = &args.history_url {
            config.servitor.history_url = url.clone();
        }
        if let Some(key) = &args.api_key {
            config.servitor.api_key = Some(key.clone());
        }

        let credentials = SharedCredential::new(config.servitor.api_key.clone());
        Ok(Self {
            config,
            credentials,
            log: args.log.clone(),
        })
    }

    /// Game log given on the command line, or `Game.log` near the working directory
    pub fn game_log(&self) -> Result<PathBuf> {
        if let Some(log) = &self.log {
            return Ok(log.clone());
        }
        let cwd = env::current_dir()?;
        find_game_log(&cwd).with_context(|| {
            format!(
                "No Game.log found in {} or its parent. Use --log to point at it.",
                cwd.display()
            )
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Status sink printing colored lines to stdout
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn status(&self, message: &str) {
        println!("{}", format_status_console(message));
    }
}

pub fn console_sink() -> Arc<dyn StatusSink> {
    Arc::new(ConsoleSink)
}

/// Wait until the login line with the player's handle shows up in `log`
pub fn wait_for_handle(log: &Path) -> String {
    let mut announced = false;
    loop {
        match find_player_handle(log) {
            Ok(Some(handle)) => {
                info!("Player handle: {}", handle);
                return handle;
            }
            Ok(None) => debug!("No login line in {:?} yet", log),
            Err(e) => debug!("Cannot read {:?}: {}", log, e),
        }
        if !announced {
            println!("Waiting for login in {}...", log.display());
            announced = true;
        }
        thread::sleep(HANDLE_RETRY_INTERVAL);
    }
}

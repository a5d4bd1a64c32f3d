//! Player identity and log location discovery.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::decode::decode_line;
use crate::error::{Error, Result};
use crate::game::markers::{self, CHARACTER_STATUS, GEID_KEY, HANDLE_KEY, LOGIN_SUCCESS};

pub const GAME_LOG_FILE: &str = "Game.log";
pub const BACKUP_DIR_NAME: &str = "logbackups";

fn scan_log<T>(path: &Path, mut find: impl FnMut(&str) -> Option<T>) -> Result<Option<T>> {
    if !path.exists() {
        return Err(Error::LogNotFound(path.display().to_string()));
    }
    let mut reader = BufReader::new(File::open(path)?);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        if let Some(found) = find(&decode_line(&raw).text) {
            return Ok(Some(found));
        }
    }
}

/// RSI handle from the login line (`Handle[<name>]`)
pub fn find_player_handle(log: &Path) -> Result<Option<String>> {
    let handle = scan_log(log, |line| {
        if !line.contains(LOGIN_SUCCESS) {
            return None;
        }
        markers::value_after(line, HANDLE_KEY, ']')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
    })?;
    debug!("Player handle in {:?}: {:?}", log, handle);
    Ok(handle)
}

/// Player geid from the character status line
pub fn find_player_geid(log: &Path) -> Result<Option<String>> {
    scan_log(log, |line| {
        if !line.contains(CHARACTER_STATUS) {
            return None;
        }
        markers::value_after(line, GEID_KEY, ' ')
            .filter(|g| !g.is_empty())
            .map(str::to_string)
    })
}

/// `Game.log` in `dir` or its parent
pub fn find_game_log(dir: &Path) -> Option<PathBuf> {
    [Some(dir), dir.parent()]
        .into_iter()
        .flatten()
        .map(|d| d.join(GAME_LOG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Backup directory next to the live log
pub fn default_backup_dir(log: &Path) -> PathBuf {
    log.parent()
        .unwrap_or_else(|| Path::new("."))
        .join(BACKUP_DIR_NAME)
}

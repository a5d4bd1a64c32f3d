//! Human-readable and JSON renderings of kills and replay results.

mod console;

pub use console::*;

use crate::backup::ReplaySummary;
use crate::error::Result;

/// Replay summary as pretty-printed JSON
pub fn format_replay_json(summary: &ReplaySummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

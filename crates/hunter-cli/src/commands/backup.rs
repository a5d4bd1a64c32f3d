//! Backup log replay command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use hunter_core::export::{format_replay_json, format_replay_summary};
use hunter_core::{default_backup_dir, Hunter, QuietSink, StatusSink};

use super::{console_sink, wait_for_handle, Context};

const PROGRESS_WIDTH: usize = 30;

pub fn run(
    context: &Context,
    dir: Option<PathBuf>,
    handle: Option<String>,
    user_id: &str,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => default_backup_dir(&context.game_log()?),
    };
    let handle = match handle {
        Some(handle) => handle,
        None => wait_for_handle(&context.game_log()?),
    };
    eprintln!("Replaying backups in {} for {}", dir.display(), handle);

    let sink: Arc<dyn StatusSink> = if quiet || json {
        Arc::new(QuietSink)
    } else {
        console_sink()
    };
    let hunter = Hunter::new(context.config.clone(), context.credentials.clone(), sink);

    let show_progress = !json;
    let mut progress = |index: usize, total: usize, path: &Path| {
        if show_progress {
            print_progress(index, total, path);
        }
    };
    let summary = hunter.replay_backups(&dir, &handle, user_id, Some(&mut progress), quiet || json);
    if show_progress {
        eprintln!();
    }

    if json {
        println!(
            "{}",
            format_replay_json(&summary).context("Failed to serialize summary")?
        );
    } else {
        println!("{}", format_replay_summary(&summary));
    }
    Ok(())
}

fn print_progress(index: usize, total: usize, path: &Path) {
    let filled = PROGRESS_WIDTH * index / total.max(1);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    eprint!(
        "\r[{}{}] {}/{} {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        index,
        total,
        name
    );
    let _ = io::stderr().flush();
}

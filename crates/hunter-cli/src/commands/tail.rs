//! Live tracking command.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use hunter_core::export::{format_kill_console, format_proximity_console};
use hunter_core::{
    find_player_geid, Hunter, KillPublisher, KillRecord, ProximityLog, ServitorHistory,
    ServitorPublisher,
};
use tracing::debug;

use super::{console_sink, wait_for_handle, Context};

/// Tail the game log until the process is stopped
pub fn run(context: &Context, handle: Option<String>) -> Result<()> {
    let log = context.game_log()?;
    let handle = match handle {
        Some(handle) => handle,
        None => wait_for_handle(&log),
    };

    println!("Hunter v{}", env!("CARGO_PKG_VERSION"));
    let player = match find_player_geid(&log) {
        Ok(Some(geid)) => format!("{} (geid {})", handle, geid),
        Ok(None) => handle.clone(),
        Err(e) => {
            debug!("Cannot read geid from {:?}: {}", log, e);
            handle.clone()
        }
    };
    println!("Tracking kills for {} in {}", player, log.display());

    let config = &context.config;
    let publisher = ConsolePublisher {
        inner: ServitorPublisher::new(&config.servitor, context.credentials.clone()),
    };
    let history = ServitorHistory::new(&config.servitor, context.credentials.clone());
    let hunter = Hunter::with_services(
        config.clone(),
        Arc::new(publisher),
        Arc::new(history),
        console_sink(),
    );
    let tailer = hunter.start_tailing(&log, &handle)?;

    let poll_interval = context.config.tracking.poll_interval();
    let mut last_seen: Option<DateTime<Utc>> = None;
    while !tailer.is_finished() {
        last_seen = print_new_proximity(hunter.proximity(), last_seen);
        std::thread::sleep(poll_interval);
    }

    tailer
        .join()
        .map_err(|_| anyhow!("Tailer thread panicked"))
}

fn print_new_proximity(
    proximity: &ProximityLog,
    last_seen: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    proximity.prune_expired_fake_hits(Utc::now());

    let mut newest = last_seen;
    for event in proximity.events() {
        if last_seen.is_some_and(|seen| event.added_at <= seen) {
            continue;
        }
        println!("{}", format_proximity_console(&event));
        newest = Some(newest.map_or(event.added_at, |n| n.max(event.added_at)));
    }
    newest
}

/// Prints each kill before handing it on for delivery
struct ConsolePublisher<P> {
    inner: P,
}

impl<P: KillPublisher> KillPublisher for ConsolePublisher<P> {
    fn publish(&self, record: &KillRecord) -> hunter_core::Result<()> {
        println!("{}", format_kill_console(record));
        self.inner.publish(record)
    }
}

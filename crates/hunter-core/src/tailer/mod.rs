//! Live log following.
//!
//! The tailer owns the read position in the game log. On first open it
//! replays the existing content with publishing disabled, so the session
//! state reflects what already happened, then follows new lines and publishes
//! kills as they appear.

mod cursor;

pub use cursor::TailCursor;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::decode::decode_line;
use crate::error::Result;
use crate::game::{LineClassifier, LineEvent, PublishMode, SessionState};
use crate::network::KillPublisher;
use crate::status::StatusSink;

pub const TAILER_THREAD_NAME: &str = "hunter-tailer";

/// Follows one log file and publishes the local player's kills
pub struct LogTailer {
    path: PathBuf,
    classifier: LineClassifier,
    state: SessionState,
    publisher: Arc<dyn KillPublisher>,
    sink: Arc<dyn StatusSink>,
    poll_interval: Duration,
    cursor: Option<TailCursor>,
    resume_at: u64,
    replayed: bool,
}

impl LogTailer {
    pub fn new(
        path: impl Into<PathBuf>,
        classifier: LineClassifier,
        publisher: Arc<dyn KillPublisher>,
        sink: Arc<dyn StatusSink>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            classifier,
            state: SessionState::new(),
            publisher,
            sink,
            poll_interval,
            cursor: None,
            resume_at: 0,
            replayed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Read position in the current file, if open
    pub fn position(&self) -> Option<u64> {
        self.cursor.as_ref().map(TailCursor::position)
    }

    /// Process everything currently available in the log
    ///
    /// Opens the file if needed (replaying existing content the first time),
    /// then consumes complete lines. When nothing new is available the file
    /// is checked for truncation and reopened from the start if it shrank.
    /// Returns the number of lines processed in publish mode.
    ///
    /// On error the file is closed and the next call reopens it at the last
    /// consumed position, so lines already seen are never published again.
    pub fn poll(&mut self) -> Result<usize> {
        let result = self.poll_open();
        if result.is_err() {
            if let Some(cursor) = self.cursor.take() {
                if self.replayed {
                    self.resume_at = cursor.position();
                }
            }
        }
        result
    }

    fn poll_open(&mut self) -> Result<usize> {
        if self.cursor.is_none() {
            self.open()?;
        }

        let mut processed = self.drain(PublishMode::Publish)?;
        if processed == 0 && self.check_rotation()? {
            processed = self.drain(PublishMode::Publish)?;
        }
        Ok(processed)
    }

    /// Follow the log forever
    pub fn run(mut self) {
        info!("Tailing {:?}", self.path);
        loop {
            match self.poll() {
                Ok(0) => thread::sleep(self.poll_interval),
                Ok(n) => debug!("Processed {} lines", n),
                Err(e) => {
                    warn!("Failed to read {:?}: {}", self.path, e);
                    self.sink
                        .status(&format!("Error reading game log {}: {}", self.path.display(), e));
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }

    /// Run on a dedicated named thread
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(TAILER_THREAD_NAME.to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    fn open(&mut self) -> Result<()> {
        let cursor = if self.replayed {
            TailCursor::resume(&self.path, self.resume_at)?
        } else {
            TailCursor::open(&self.path)?
        };
        debug!(
            "Opened {:?} at {} ({} bytes)",
            self.path,
            cursor.position(),
            cursor.last_size()
        );
        if self.replayed && cursor.position() < self.resume_at {
            info!("Log file {:?} shrank while closed, reading from the start", self.path);
            self.sink.status("Game log was reset, following the new session");
        }
        self.resume_at = cursor.position();
        self.cursor = Some(cursor);

        if !self.replayed {
            let lines = self.drain(PublishMode::Observe)?;
            self.replayed = true;
            info!(
                "Replayed {} existing lines (mode: {}, ship: {})",
                lines,
                self.state.game_mode,
                self.state.ship_used()
            );
        }
        Ok(())
    }

    fn check_rotation(&mut self) -> Result<bool> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(false);
        };
        let rotated = cursor.check_rotation()?;
        if rotated {
            info!("Log file {:?} was truncated, reading from the start", self.path);
            self.sink.status("Game log was reset, following the new session");
        }
        Ok(rotated)
    }

    fn drain(&mut self, mode: PublishMode) -> Result<usize> {
        let mut count = 0;
        while let Some(raw) = self.next_raw_line()? {
            self.handle_line(&raw, mode);
            count += 1;
        }
        Ok(count)
    }

    fn next_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_line(),
            None => Ok(None),
        }
    }

    fn handle_line(&mut self, raw: &[u8], mode: PublishMode) {
        let decoded = decode_line(raw);
        for run in &decoded.invalid_runs {
            warn!("Decode issue in {:?}: {}", self.path, run);
            self.sink.status(&format!("Decode error in game log: {}", run));
        }

        match self.classifier.classify(&mut self.state, &decoded.text, mode) {
            Some(LineEvent::Kill(record)) => {
                self.sink
                    .status(&format!("You have killed {}", record.victim));
                if let Err(e) = self.publisher.publish(&record) {
                    self.sink.status(&e.to_string());
                }
            }
            Some(LineEvent::Death) => self.sink.status("You have died"),
            None => {}
        }
    }
}

//! In-memory publisher and history source for tests and dry runs.

use std::sync::{Arc, Mutex, PoisonError};

use super::{KillHistorySource, KillPublisher, RemoteKill};
use crate::error::{Error, Result};
use crate::game::KillRecord;

/// Records every publish attempt
#[derive(Debug, Clone, Default)]
pub struct MockPublisher {
    attempts: Arc<Mutex<Vec<KillRecord>>>,
    reject_with: Option<u16>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher whose every attempt is rejected with `status`
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<KillRecord> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl KillPublisher for MockPublisher {
    fn publish(&self, record: &KillRecord) -> Result<()> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        match self.reject_with {
            Some(status) => Err(Error::Rejected(status)),
            None => Ok(()),
        }
    }
}

/// Fixed kill history
#[derive(Debug, Clone, Default)]
pub struct MockHistory {
    kills: Vec<RemoteKill>,
    fail: bool,
}

impl MockHistory {
    pub fn new(kills: Vec<RemoteKill>) -> Self {
        Self { kills, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            kills: Vec::new(),
            fail: true,
        }
    }
}

impl KillHistorySource for MockHistory {
    fn fetch_kills(&self, _user_id: &str) -> Result<Vec<RemoteKill>> {
        if self.fail {
            return Err(Error::Http("Connection failed: mock history".to_string()));
        }
        Ok(self.kills.clone())
    }
}

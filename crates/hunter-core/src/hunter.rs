use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::info;

use crate::backup::{BackupReplay, DedupPolicy, ProgressFn, ReplaySummary};
use crate::config::Config;
use crate::error::Result;
use crate::game::{LineClassifier, ProximityLog};
use crate::network::{
    KillHistorySource, KillPublisher, ServitorHistory, ServitorPublisher, SharedCredential,
};
use crate::status::StatusSink;
use crate::tailer::LogTailer;

/// Main kill tracker
///
/// Holds the services shared by every tailer and replay: the publisher, the
/// history source, the status sink and the proximity log.
pub struct Hunter {
    config: Config,
    publisher: Arc<dyn KillPublisher>,
    history: Arc<dyn KillHistorySource>,
    sink: Arc<dyn StatusSink>,
    proximity: ProximityLog,
}

impl Hunter {
    /// Tracker talking to Servitor with the given credential
    pub fn new(config: Config, credentials: SharedCredential, sink: Arc<dyn StatusSink>) -> Self {
        let publisher = Arc::new(ServitorPublisher::new(&config.servitor, credentials.clone()));
        let history = Arc::new(ServitorHistory::new(&config.servitor, credentials));
        Self::with_services(config, publisher, history, sink)
    }

    pub fn with_services(
        config: Config,
        publisher: Arc<dyn KillPublisher>,
        history: Arc<dyn KillHistorySource>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let proximity = ProximityLog::new(&config.proximity);
        Self {
            config,
            publisher,
            history,
            sink,
            proximity,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared nearby-player / interdiction history fed by live tailers
    pub fn proximity(&self) -> &ProximityLog {
        &self.proximity
    }

    /// Build a tailer for `log_path` without starting it
    pub fn tailer(&self, log_path: impl Into<PathBuf>, player_handle: &str) -> LogTailer {
        let classifier =
            LineClassifier::new(player_handle, self.config.tracking.vehicle_context_max_age())
                .with_proximity(self.proximity.clone());

        LogTailer::new(
            log_path,
            classifier,
            Arc::clone(&self.publisher),
            Arc::clone(&self.sink),
            self.config.tracking.poll_interval(),
        )
    }

    /// Follow `log_path` on a background thread
    pub fn start_tailing(
        &self,
        log_path: impl Into<PathBuf>,
        player_handle: &str,
    ) -> Result<JoinHandle<()>> {
        let tailer = self.tailer(log_path, player_handle);
        info!("Starting tailer for {} on {:?}", player_handle, tailer.path());
        tailer.spawn()
    }

    /// Replay backup logs and return the full summary
    pub fn replay_backups(
        &self,
        dir: &Path,
        player_handle: &str,
        user_id: &str,
        progress: Option<&mut ProgressFn<'_>>,
        suppress_logs: bool,
    ) -> ReplaySummary {
        let replay = BackupReplay::new(
            self.publisher.as_ref(),
            self.history.as_ref(),
            self.sink.as_ref(),
            DedupPolicy::from(&self.config.dedup),
            self.config.tracking.vehicle_context_max_age(),
        );
        replay.run(dir, player_handle, user_id, progress, suppress_logs)
    }

    /// Replay backup logs, returning `(uploaded, duplicates)`
    pub fn parse_backup_logs(
        &self,
        dir: &Path,
        player_handle: &str,
        user_id: &str,
        progress: Option<&mut ProgressFn<'_>>,
        suppress_logs: bool,
    ) -> (usize, usize) {
        self.replay_backups(dir, player_handle, user_id, progress, suppress_logs)
            .counts()
    }
}

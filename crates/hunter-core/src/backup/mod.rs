//! Offline replay of archived game logs.
//!
//! Kills found in backup logs are compared against what Servitor already
//! recorded for the user and only the missing ones are published.

mod dedup;

pub use dedup::*;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::decode::decode_line;
use crate::error::Result;
use crate::game::{KillRecord, LineClassifier, ParsedKill, PublishMode, SessionState};
use crate::network::{KillHistorySource, KillPublisher};
use crate::status::StatusSink;

pub const BACKUP_EXTENSION: &str = "log";

/// Per-victim kill breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VictimTally {
    pub kills: usize,
    pub weapons: BTreeMap<String, usize>,
    pub damage_types: BTreeMap<String, usize>,
}

/// Result of one replay run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub total_kills: usize,
    pub by_victim: BTreeMap<String, VictimTally>,
    pub uploaded: usize,
    pub duplicates: usize,
    pub failed_uploads: Vec<KillRecord>,
    pub files_processed: usize,
    pub files_failed: usize,
}

impl ReplaySummary {
    /// `(uploaded, duplicates)`
    pub fn counts(&self) -> (usize, usize) {
        (self.uploaded, self.duplicates)
    }

    fn tally(&mut self, record: &KillRecord) {
        self.total_kills += 1;
        let tally = self.by_victim.entry(record.victim.clone()).or_default();
        tally.kills += 1;
        *tally.weapons.entry(record.weapon.clone()).or_default() += 1;
        *tally.damage_types.entry(record.damage_type.clone()).or_default() += 1;
    }
}

/// Progress callback: `(index, total, path)` with a 1-based index
pub type ProgressFn<'p> = dyn FnMut(usize, usize, &Path) + 'p;

/// Backup log files in `dir`, sorted by file name
pub fn list_backup_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(BACKUP_EXTENSION))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Replays backup logs for one player
pub struct BackupReplay<'a> {
    publisher: &'a dyn KillPublisher,
    history: &'a dyn KillHistorySource,
    sink: &'a dyn StatusSink,
    policy: DedupPolicy,
    context_max_age: chrono::Duration,
}

impl<'a> BackupReplay<'a> {
    pub fn new(
        publisher: &'a dyn KillPublisher,
        history: &'a dyn KillHistorySource,
        sink: &'a dyn StatusSink,
        policy: DedupPolicy,
        context_max_age: chrono::Duration,
    ) -> Self {
        Self {
            publisher,
            history,
            sink,
            policy,
            context_max_age,
        }
    }

    /// Replay every backup log in `dir`
    ///
    /// Never fails: history, listing and per-file errors are reported and
    /// the run continues with what is available.
    pub fn run(
        &self,
        dir: &Path,
        handle: &str,
        user_id: &str,
        mut progress: Option<&mut ProgressFn<'_>>,
        suppress_logs: bool,
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        let report = |message: &str| {
            if suppress_logs {
                debug!("{}", message);
            } else {
                self.sink.status(message);
            }
        };

        let files = match list_backup_files(dir) {
            Ok(files) => files,
            Err(e) => {
                debug!("Cannot list {:?}: {}", dir, e);
                Vec::new()
            }
        };
        if files.is_empty() {
            report(&format!("No backup logs found in {}", dir.display()));
            return summary;
        }

        let cache = self.load_cache(user_id);
        let classifier = LineClassifier::new(handle, self.context_max_age);
        let total = files.len();

        for (index, path) in files.iter().enumerate() {
            if let Some(progress) = progress.as_deref_mut() {
                progress(index + 1, total, path.as_path());
            }
            report(&format!("Processing {} ({}/{})", path.display(), index + 1, total));

            // Each backup is its own game session
            let mut state = SessionState::new();
            match self.replay_file(path, &classifier, &mut state, &cache, &mut summary) {
                Ok(()) => summary.files_processed += 1,
                Err(e) => {
                    warn!("Failed to replay {:?}: {}", path, e);
                    report(&format!("Skipping {}: {}", path.display(), e));
                    summary.files_failed += 1;
                }
            }
        }

        info!(
            "Backup replay finished: {} kills, {} uploaded, {} duplicates, {} failed",
            summary.total_kills,
            summary.uploaded,
            summary.duplicates,
            summary.failed_uploads.len()
        );
        summary
    }

    fn load_cache(&self, user_id: &str) -> DuplicateKillCache {
        match self.history.fetch_kills(user_id) {
            Ok(kills) => DuplicateKillCache::from_remote(&kills),
            Err(e) => {
                warn!("Could not fetch kill history, every kill will be uploaded: {}", e);
                self.sink
                    .status(&format!("Could not fetch existing kills: {}", e));
                DuplicateKillCache::new()
            }
        }
    }

    fn replay_file(
        &self,
        path: &Path,
        classifier: &LineClassifier,
        state: &mut SessionState,
        cache: &DuplicateKillCache,
        summary: &mut ReplaySummary,
    ) -> Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }

            let decoded = decode_line(&raw);
            for run in &decoded.invalid_runs {
                warn!("Decode issue in {:?}: {}", path, run);
            }
            let line = decoded.text.as_str();

            classifier.classify(state, line, PublishMode::Observe);
            if !classifier.is_kill_candidate(state, line) {
                continue;
            }

            match classifier.parse_kill(state, line) {
                Ok(ParsedKill::Kill(record)) => self.handle_kill(record, cache, summary),
                Ok(ParsedKill::Death) => {}
                Err(e) => warn!("Skipping kill line in {:?}: {}", path, e),
            }
        }
        Ok(())
    }

    fn handle_kill(
        &self,
        record: KillRecord,
        cache: &DuplicateKillCache,
        summary: &mut ReplaySummary,
    ) {
        summary.tally(&record);

        if cache.is_duplicate(&record, &self.policy) {
            debug!("Already recorded: {} at {}", record.victim, record.time);
            summary.duplicates += 1;
            return;
        }

        match self.publisher.publish(&record) {
            Ok(()) => summary.uploaded += 1,
            Err(e) => {
                debug!("Upload of {} failed: {}", record.victim, e);
                summary.failed_uploads.push(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::{MockHistory, MockPublisher};
    use crate::network::RemoteKill;
    use crate::status::MemorySink;

    const KILL: &str = "<2025-04-14T16:42:53.465Z> [Notice] <Actor Death> CActor::Kill: 'idkausername_27' [202063593546] in zone 'OOC_Stanton_2a_Cellin' killed by 'DocHound' [202061381370] using 'lbco_pistol_energy_01_2698343630880' [Class lbco_pistol_energy_01] with damage type 'Bullet' from direction x: -0.995284, y: -0.073818, z: -0.062935 [Team_ActorTech][Actor]\n";

    fn max_age() -> chrono::Duration {
        chrono::Duration::seconds(30)
    }

    #[test]
    fn test_missing_directory_is_empty_summary() {
        let publisher = MockPublisher::new();
        let history = MockHistory::default();
        let sink = MemorySink::new();
        let replay = BackupReplay::new(&publisher, &history, &sink, DedupPolicy::default(), max_age());

        let summary = replay.run(Path::new("/definitely/not/here"), "DocHound", "1", None, false);
        assert_eq!(summary, ReplaySummary::default());
        assert!(sink.contains("No backup logs found"));
    }

    #[test]
    fn test_only_log_files_are_listed_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.log"), "").unwrap();
        fs::write(dir.path().join("a.log"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("c.log")).unwrap();

        let files = list_backup_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log"]);
    }

    #[test]
    fn test_failed_upload_is_retained() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Game Build(1).log"), KILL).unwrap();

        let publisher = MockPublisher::rejecting(403);
        let history = MockHistory::failing();
        let sink = MemorySink::new();
        let replay = BackupReplay::new(&publisher, &history, &sink, DedupPolicy::default(), max_age());

        let summary = replay.run(dir.path(), "DocHound", "1", None, true);
        assert_eq!(summary.total_kills, 1);
        assert_eq!(summary.uploaded, 0);
        assert_eq!(summary.failed_uploads.len(), 1);
        assert_eq!(summary.failed_uploads[0].victim, "idkausername_27");
        // History failures are reported even when per-file logs are suppressed
        assert!(sink.contains("Could not fetch existing kills"));
        assert!(!sink.contains("Processing"));
    }

    #[test]
    fn test_progress_is_one_based() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.log"), KILL).unwrap();
        fs::write(dir.path().join("2.log"), "").unwrap();

        let publisher = MockPublisher::new();
        let history = MockHistory::new(vec![RemoteKill {
            victim: "IDKAUSERNAME_27".to_string(),
            timestamp: "2025-04-14T16:42:00Z".to_string(),
        }]);
        let sink = MemorySink::new();
        let replay = BackupReplay::new(&publisher, &history, &sink, DedupPolicy::default(), max_age());

        let mut seen = Vec::new();
        let mut progress = |index: usize, total: usize, _path: &Path| seen.push((index, total));
        let summary = replay.run(dir.path(), "DocHound", "1", Some(&mut progress), false);

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.counts(), (0, 1));
        assert_eq!(publisher.attempt_count(), 0);
    }

    #[test]
    fn test_session_does_not_carry_into_next_file() {
        let dir = tempfile::tempdir().unwrap();
        let free_flight = "<2025-04-14T16:00:00.000Z> [Notice] <Context Establisher Done> establisher=\"CReplicationModel\" runningTime=12.5 map=\"megamap\" gamerules=\"EA_FreeFlight\" sessionId=\"abc\" [Team_Network][Network][Replication]\n";
        fs::write(dir.path().join("1.log"), free_flight).unwrap();
        fs::write(dir.path().join("2.log"), KILL).unwrap();

        let publisher = MockPublisher::new();
        let history = MockHistory::default();
        let sink = MemorySink::new();
        let replay = BackupReplay::new(&publisher, &history, &sink, DedupPolicy::default(), max_age());

        let summary = replay.run(dir.path(), "DocHound", "1", None, true);
        assert_eq!(summary.uploaded, 1);
        let attempts = publisher.attempts();
        assert_eq!(attempts[0].game_mode, "Nothing");
        assert_eq!(attempts[0].ship_used, "N/A");
    }

    #[test]
    fn test_victim_tally() {
        let mut summary = ReplaySummary::default();
        let record = KillRecord {
            player: "DocHound".to_string(),
            time: "t".to_string(),
            victim: "Mercuriuss".to_string(),
            killer: "DocHound".to_string(),
            zone: "z".to_string(),
            weapon: "gatling".to_string(),
            damage_type: "VehicleDestruction".to_string(),
            location: None,
            coordinates: None,
            game_mode: "EA_FreeFlight".to_string(),
            ship_used: "AEGS_Gladius".to_string(),
        };
        summary.tally(&record);
        summary.tally(&record);

        let tally = &summary.by_victim["Mercuriuss"];
        assert_eq!(summary.total_kills, 2);
        assert_eq!(tally.kills, 2);
        assert_eq!(tally.weapons["gatling"], 2);
        assert_eq!(tally.damage_types["VehicleDestruction"], 2);
    }
}

pub mod backup;
pub mod config;
pub mod decode;
pub mod error;
pub mod export;
pub mod game;
pub mod hunter;
pub mod identity;
pub mod network;
pub mod status;
pub mod tailer;

pub use backup::{BackupReplay, DedupPolicy, DuplicateKillCache, ReplaySummary, VictimTally};
pub use config::Config;
pub use decode::{decode_line, DecodedLine, InvalidRun};
pub use error::{Error, Result};
pub use game::{
    KillRecord, LineClassifier, LineEvent, ProximityEvent, ProximityKind, ProximityLog,
    PublishMode, SessionState,
};
pub use hunter::Hunter;
pub use identity::{default_backup_dir, find_game_log, find_player_geid, find_player_handle};
pub use network::{
    CredentialProvider, KillHistorySource, KillPublisher, RemoteKill, ServitorHistory,
    ServitorPublisher, SharedCredential,
};
pub use status::{MemorySink, QuietSink, StatusSink};
pub use tailer::LogTailer;

use chrono::{DateTime, Duration, Utc};

use crate::config::DedupConfig;
use crate::game::{parse_timestamp, KillRecord};
use crate::network::RemoteKill;

/// How close two kills of the same victim must be to count as one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupPolicy {
    pub window: Duration,
}

impl DedupPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::from(&DedupConfig::default())
    }
}

impl From<&DedupConfig> for DedupPolicy {
    fn from(config: &DedupConfig) -> Self {
        Self::new(Duration::seconds(config.window_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KillTime {
    Parsed(DateTime<Utc>),
    Unparsed,
}

impl KillTime {
    fn new(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Some(time) => Self::Parsed(time),
            None => Self::Unparsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedKill {
    victim: String,
    time: KillTime,
    raw_time: String,
}

/// Kills already recorded by Servitor, keyed by lowercased victim
#[derive(Debug, Clone, Default)]
pub struct DuplicateKillCache {
    kills: Vec<CachedKill>,
}

impl DuplicateKillCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_remote(kills: &[RemoteKill]) -> Self {
        let mut cache = Self::new();
        for kill in kills {
            cache.insert(&kill.victim, &kill.timestamp);
        }
        cache
    }

    pub fn insert(&mut self, victim: &str, timestamp: &str) {
        self.kills.push(CachedKill {
            victim: victim.to_lowercase(),
            time: KillTime::new(timestamp),
            raw_time: timestamp.trim().to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.kills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kills.is_empty()
    }

    /// Check whether `record` matches a recorded kill
    ///
    /// Same victim (case-insensitive) and timestamps at most `policy.window`
    /// apart. When either timestamp cannot be parsed the raw strings must be
    /// equal.
    pub fn is_duplicate(&self, record: &KillRecord, policy: &DedupPolicy) -> bool {
        let victim = record.victim.to_lowercase();
        let time = KillTime::new(&record.time);

        self.kills
            .iter()
            .filter(|cached| cached.victim == victim)
            .any(|cached| match (&cached.time, &time) {
                (KillTime::Parsed(a), KillTime::Parsed(b)) => (*a - *b).abs() <= policy.window,
                _ => cached.raw_time == record.time.trim(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kill(victim: &str, time: &str) -> KillRecord {
        KillRecord {
            player: "DocHound".to_string(),
            time: time.to_string(),
            victim: victim.to_string(),
            killer: "DocHound".to_string(),
            zone: "zone".to_string(),
            weapon: "weapon".to_string(),
            damage_type: "Bullet".to_string(),
            location: None,
            coordinates: None,
            game_mode: "SC_Default".to_string(),
            ship_used: "N/A".to_string(),
        }
    }

    fn cache() -> DuplicateKillCache {
        DuplicateKillCache::from_remote(&[RemoteKill {
            victim: "Mercuriuss".to_string(),
            timestamp: "2025-04-14T16:00:00Z".to_string(),
        }])
    }

    #[test]
    fn test_within_window_is_duplicate() {
        let policy = DedupPolicy::default();
        assert!(cache().is_duplicate(&kill("mercuriuss", "2025-04-14T16:00:45.000Z"), &policy));
        assert!(cache().is_duplicate(&kill("MERCURIUSS", "2025-04-14T15:59:15Z"), &policy));
    }

    #[test]
    fn test_outside_window_is_not_duplicate() {
        let policy = DedupPolicy::default();
        assert!(!cache().is_duplicate(&kill("Mercuriuss", "2025-04-14T16:01:15.000Z"), &policy));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let policy = DedupPolicy::new(Duration::seconds(60));
        assert!(cache().is_duplicate(&kill("Mercuriuss", "2025-04-14T16:01:00Z"), &policy));
    }

    #[test]
    fn test_other_victim_is_not_duplicate() {
        let policy = DedupPolicy::default();
        assert!(!cache().is_duplicate(&kill("DocHound", "2025-04-14T16:00:00Z"), &policy));
    }

    #[test]
    fn test_unparsable_timestamps_compare_raw() {
        let mut cache = DuplicateKillCache::new();
        cache.insert("Mercuriuss", "sometime");
        let policy = DedupPolicy::default();

        assert!(cache.is_duplicate(&kill("Mercuriuss", "sometime"), &policy));
        assert!(!cache.is_duplicate(&kill("Mercuriuss", "2025-04-14T16:00:00Z"), &policy));
    }
}

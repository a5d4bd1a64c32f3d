//! Nearby-player and interdiction history.
//!
//! Actor stalls (another player's avatar streaming in) and fake hits
//! (interdiction fire against a ship) arrive in bursts. The tracker keeps a
//! small, capped, time-ordered history with burst suppression; rendering is
//! left to the host.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::debug;

use super::markers::{self, FAKE_HIT_CHILD_KEY, FAKE_HIT_TARGET_KEY, STALL_PLAYER_KEY};
use super::timestamp::line_timestamp;
use crate::config::{limits, ProximityConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProximityKind {
    ActorStall,
    FakeHit,
}

/// A proximity event parsed from a log line, before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProximitySighting {
    ActorStall {
        player: String,
        timestamp: String,
    },
    FakeHit {
        from_player: String,
        target_player: String,
        ship: String,
        timestamp: String,
    },
}

impl ProximitySighting {
    pub fn kind(&self) -> ProximityKind {
        match self {
            Self::ActorStall { .. } => ProximityKind::ActorStall,
            Self::FakeHit { .. } => ProximityKind::FakeHit,
        }
    }

    /// Parse an `<Actor stall>` line
    ///
    /// `... <Actor stall> Actor stall detected, Player: Name, Type: downstream, Length: 2.5. [...]`
    pub fn parse_actor_stall(line: &str) -> Option<Self> {
        let player = markers::value_after(line, STALL_PLAYER_KEY, ',')?.trim();
        if player.is_empty() {
            return None;
        }
        Some(Self::ActorStall {
            player: player.to_string(),
            timestamp: line_timestamp(line).unwrap_or_default().to_string(),
        })
    }

    /// Parse a fake hit line
    ///
    /// `... Fake hit FROM Attacker TO AEGS_Gladius_123. Being sent to child Target [...]`
    pub fn parse_fake_hit(line: &str) -> Option<Self> {
        let from_player = markers::value_after(line, markers::FAKE_HIT, ' ')?.trim();
        let ship = markers::value_after(line, FAKE_HIT_TARGET_KEY, ' ')
            .map(|s| s.trim_end_matches('.'))
            .unwrap_or_default();
        let target_player = markers::value_after(line, FAKE_HIT_CHILD_KEY, ' ')
            .map(str::trim)
            .unwrap_or_default();

        if from_player.is_empty() {
            return None;
        }

        Some(Self::FakeHit {
            from_player: from_player.to_string(),
            target_player: target_player.to_string(),
            ship: ship.to_string(),
            timestamp: line_timestamp(line).unwrap_or_default().to_string(),
        })
    }
}

/// A stored proximity event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityEvent {
    pub kind: ProximityKind,
    /// Player the event is about (the target for fake hits)
    pub player: String,
    /// Log timestamp of the originating line
    pub timestamp: String,
    /// Wall-clock time the event was recorded
    pub added_at: DateTime<Utc>,
    pub from_player: Option<String>,
    pub ship: Option<String>,
    /// End of the presentation pin (fake hits only)
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProximityEvent {
    pub fn is_pinned(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| now < t)
    }
}

/// Bounded, burst-suppressed proximity history
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    events: VecDeque<ProximityEvent>,
    fake_hits: VecDeque<ProximityEvent>,
    dedup_window: Duration,
    fake_hit_pin: Duration,
}

impl ProximityTracker {
    pub fn new(config: &ProximityConfig) -> Self {
        Self {
            events: VecDeque::with_capacity(limits::PROXIMITY_HISTORY_CAPACITY),
            fake_hits: VecDeque::with_capacity(limits::FAKE_HIT_CAPACITY),
            dedup_window: Duration::seconds(config.dedup_window_secs),
            fake_hit_pin: Duration::seconds(config.fake_hit_pin_secs),
        }
    }

    /// Record a sighting at wall-clock time `now`
    ///
    /// Returns `false` when the sighting was discarded as part of a burst.
    pub fn record_at(&mut self, sighting: ProximitySighting, now: DateTime<Utc>) -> bool {
        let event = self.normalize(sighting, now);

        let burst = self
            .events
            .iter()
            .rev()
            .take(limits::PROXIMITY_LOOKBACK)
            .any(|e| {
                e.kind == event.kind
                    && e.player == event.player
                    && now - e.added_at < self.dedup_window
            });
        if burst {
            debug!("Suppressed {} burst for {}", event.kind, event.player);
            return false;
        }

        if event.kind == ProximityKind::FakeHit {
            self.fake_hits.push_back(event.clone());
            while self.fake_hits.len() > limits::FAKE_HIT_CAPACITY {
                self.fake_hits.pop_front();
            }
        }

        self.events.push_back(event);
        while self.events.len() > limits::PROXIMITY_HISTORY_CAPACITY {
            self.events.pop_front();
        }
        true
    }

    pub fn record(&mut self, sighting: ProximitySighting) -> bool {
        self.record_at(sighting, Utc::now())
    }

    fn normalize(&self, sighting: ProximitySighting, now: DateTime<Utc>) -> ProximityEvent {
        match sighting {
            ProximitySighting::ActorStall { player, timestamp } => ProximityEvent {
                kind: ProximityKind::ActorStall,
                player,
                timestamp,
                added_at: now,
                from_player: None,
                ship: None,
                expires_at: None,
            },
            ProximitySighting::FakeHit {
                from_player,
                target_player,
                ship,
                timestamp,
            } => {
                let player = if target_player.is_empty() {
                    from_player.clone()
                } else {
                    target_player
                };
                ProximityEvent {
                    kind: ProximityKind::FakeHit,
                    player,
                    timestamp,
                    added_at: now,
                    from_player: Some(from_player),
                    ship: (!ship.is_empty()).then_some(ship),
                    expires_at: Some(now + self.fake_hit_pin),
                }
            }
        }
    }

    /// Drop fake hits whose pin has ended
    pub fn prune_expired_fake_hits(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.fake_hits.len();
        self.fake_hits.retain(|e| e.is_pinned(now));
        before - self.fake_hits.len()
    }

    /// Unified history, oldest first
    pub fn events(&self) -> impl Iterator<Item = &ProximityEvent> {
        self.events.iter()
    }

    pub fn actor_stalls(&self) -> impl Iterator<Item = &ProximityEvent> {
        self.events
            .iter()
            .filter(|e| e.kind == ProximityKind::ActorStall)
    }

    pub fn fake_hits(&self) -> impl Iterator<Item = &ProximityEvent> {
        self.fake_hits.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for ProximityTracker {
    fn default() -> Self {
        Self::new(&ProximityConfig::default())
    }
}

/// Shared handle to a `ProximityTracker`
///
/// Cloned into the classifier (writer) and the presentation layer (reader).
#[derive(Debug, Clone, Default)]
pub struct ProximityLog {
    inner: Arc<Mutex<ProximityTracker>>,
}

impl ProximityLog {
    pub fn new(config: &ProximityConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ProximityTracker::new(config))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProximityTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, sighting: ProximitySighting) -> bool {
        self.lock().record(sighting)
    }

    pub fn record_at(&self, sighting: ProximitySighting, now: DateTime<Utc>) -> bool {
        self.lock().record_at(sighting, now)
    }

    pub fn events(&self) -> Vec<ProximityEvent> {
        self.lock().events().cloned().collect()
    }

    pub fn actor_stalls(&self) -> Vec<ProximityEvent> {
        self.lock().actor_stalls().cloned().collect()
    }

    pub fn fake_hits(&self) -> Vec<ProximityEvent> {
        self.lock().fake_hits().cloned().collect()
    }

    pub fn prune_expired_fake_hits(&self, now: DateTime<Utc>) -> usize {
        self.lock().prune_expired_fake_hits(now)
    }
}

//! Line classification and session state transitions.
//!
//! Each decoded line is checked against an ordered rule table. Rules run in
//! table order and later rules rely on state updated by earlier ones (a spawn
//! line is only trusted once the game mode and player geid are known).
//!
//! Rule order:
//! 1. Game mode (`<Context Establisher Done>`), ends evaluation for the line
//! 2. Player identity (character status line)
//! 3. Zone entry by the local player (ship boarding)
//! 4. Kill by the local player
//! 5. Vehicle destruction context
//! 6. Ship spawn
//! 7. Ship destruction / local death
//! 8. Actor stall
//! 9. Fake hit

use tracing::{debug, info, warn};

use super::kill::{parse_kill_line, KillRecord, ParsedKill};
use super::markers::{self, *};
use super::proximity::{ProximityLog, ProximitySighting};
use super::session::{Coordinates, SessionState, VehicleContext};
use super::timestamp::line_timestamp;
use crate::error::Result;

/// Whether kills found while classifying should be parsed for publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Publish,
    Observe,
}

/// Semantic event produced by a line
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    Kill(KillRecord),
    /// The local player died (or the kill could not be attributed)
    Death,
}

enum Flow {
    Continue,
    Stop,
}

struct Rule {
    name: &'static str,
    matches: fn(&LineClassifier, &SessionState, &str, PublishMode) -> bool,
    apply: fn(&LineClassifier, &mut SessionState, &str, &mut Option<LineEvent>) -> Flow,
}

const RULES: [Rule; 9] = [
    Rule {
        name: "game_mode",
        matches: |_, _, line, _| line.contains(CONTEXT_ESTABLISHER_DONE),
        apply: LineClassifier::apply_game_mode,
    },
    Rule {
        name: "player_identity",
        matches: |_, _, line, _| line.contains(CHARACTER_STATUS),
        apply: LineClassifier::apply_player_identity,
    },
    Rule {
        name: "zone_entry",
        matches: |c, _, line, _| c.mentions_player(line) && line.contains(ENTER_ZONE),
        apply: LineClassifier::apply_zone_entry,
    },
    Rule {
        name: "player_kill",
        matches: |c, state, line, mode| {
            mode == PublishMode::Publish && c.is_kill_candidate(state, line)
        },
        apply: LineClassifier::apply_kill,
    },
    Rule {
        name: "vehicle_context",
        matches: |_, _, line, _| line.contains(VEHICLE_DESTRUCTION),
        apply: LineClassifier::apply_vehicle_context,
    },
    Rule {
        name: "ship_spawn",
        matches: |_, state, line, _| {
            line.contains(VEHICLE_SPAWNED)
                && !state.is_default_mode()
                && state
                    .player_geid
                    .as_deref()
                    .is_some_and(|geid| line.contains(geid))
        },
        apply: LineClassifier::apply_ship_spawn,
    },
    Rule {
        name: "ship_destroyed",
        matches: |_, state, line, _| {
            let own_vehicle = line.contains(VEHICLE_DESTRUCTION)
                && state
                    .active_ship_id
                    .as_deref()
                    .is_some_and(|id| line.contains(id));
            own_vehicle || line.contains(LOCAL_CLIENT_DEAD)
        },
        apply: LineClassifier::apply_ship_destroyed,
    },
    Rule {
        name: "actor_stall",
        matches: |c, _, line, _| c.proximity.is_some() && line.contains(ACTOR_STALL),
        apply: LineClassifier::apply_actor_stall,
    },
    Rule {
        name: "fake_hit",
        matches: |c, _, line, _| c.proximity.is_some() && line.contains(markers::FAKE_HIT),
        apply: LineClassifier::apply_fake_hit,
    },
];

/// Classifies log lines for one player
#[derive(Debug, Clone)]
pub struct LineClassifier {
    player: String,
    proximity: Option<ProximityLog>,
    context_max_age: chrono::Duration,
}

impl LineClassifier {
    pub fn new(player: impl Into<String>, context_max_age: chrono::Duration) -> Self {
        Self {
            player: player.into(),
            proximity: None,
            context_max_age,
        }
    }

    /// Feed actor-stall and fake-hit lines into `proximity`
    pub fn with_proximity(mut self, proximity: ProximityLog) -> Self {
        self.proximity = Some(proximity);
        self
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// Classify one line, updating `state`
    pub fn classify(
        &self,
        state: &mut SessionState,
        line: &str,
        mode: PublishMode,
    ) -> Option<LineEvent> {
        let mut event = None;
        for rule in &RULES {
            if !(rule.matches)(self, state, line, mode) {
                continue;
            }
            debug!("Rule '{}' matched", rule.name);
            if let Flow::Stop = (rule.apply)(self, state, line, &mut event) {
                break;
            }
        }
        event
    }

    /// Whether `line` is a kill by or of the local player that should be parsed
    pub fn is_kill_candidate(&self, state: &SessionState, line: &str) -> bool {
        self.mentions_player(line)
            && line.contains(ACTOR_KILL)
            && !markers::is_excluded_kill(line)
            && !self.is_ship_reset(state, line)
    }

    /// Parse a kill candidate against the current session state
    pub fn parse_kill(&self, state: &SessionState, line: &str) -> Result<ParsedKill> {
        parse_kill_line(line, &self.player, state, self.context_max_age)
    }

    fn mentions_player(&self, line: &str) -> bool {
        !self.player.is_empty() && line.contains(self.player.as_str())
    }

    // Free-flight ship resets are logged as crash kills. This is an
    // approximation and can drop a real crash kill in free flight.
    fn is_ship_reset(&self, state: &SessionState, line: &str) -> bool {
        if state.game_mode == FREE_FLIGHT_GAME_MODE && line.contains(CRASH) {
            debug!("Probably a ship reset, ignoring kill");
            return true;
        }
        false
    }

    fn apply_game_mode(
        &self,
        state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        match markers::value_after(line, GAME_RULES_KEY, ' ') {
            Some(raw) => {
                let mode = raw.trim_matches('"');
                if mode != state.game_mode {
                    info!("Game mode: {} -> {}", state.game_mode, mode);
                }
                state.set_game_mode(mode);
            }
            None => warn!("Context line without game rules: {}", line.trim_end()),
        }
        Flow::Stop
    }

    fn apply_player_identity(
        &self,
        state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        if let Some(geid) = markers::value_after(line, GEID_KEY, ' ') {
            if !geid.is_empty() && state.player_geid.as_deref() != Some(geid) {
                info!("Player geid: {}", geid);
                state.player_geid = Some(geid.to_string());
            }
        }
        Flow::Continue
    }

    fn apply_zone_entry(
        &self,
        state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        let entity = markers::value_after(line, ENTITY_KEY, ' ')
            .map(markers::unwrap_token)
            .unwrap_or_default();

        if !entity.is_empty() && markers::is_ship_entity(entity) {
            let (ship, id) = markers::split_instance_suffix(entity);
            info!("Active zone change: {} with ID: {}", ship, id.unwrap_or("N/A"));
            state.enter_ship(ship, id);
        } else {
            debug!("Zone change to non-ship entity '{}'", entity);
            state.active_ship = None;
        }
        Flow::Continue
    }

    fn apply_kill(
        &self,
        state: &mut SessionState,
        line: &str,
        event: &mut Option<LineEvent>,
    ) -> Flow {
        match self.parse_kill(state, line) {
            Ok(ParsedKill::Kill(record)) => {
                info!("Kill: {} by {} using {}", record.victim, record.killer, record.weapon);
                *event = Some(LineEvent::Kill(record));
            }
            Ok(ParsedKill::Death) => {
                info!("Local player died");
                *event = Some(LineEvent::Death);
            }
            Err(e) => warn!("Skipping kill line: {}", e),
        }
        Flow::Continue
    }

    fn apply_vehicle_context(
        &self,
        state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        let Some(killer) = markers::value_after(line, CAUSED_BY_KEY, '\'') else {
            return Flow::Continue;
        };
        if !self.player.is_empty() && killer != self.player {
            return Flow::Continue;
        }

        let context = VehicleContext {
            zone: markers::value_after(line, ZONE_KEY, '\'')
                .unwrap_or_default()
                .to_string(),
            coordinates: parse_position(line),
            time: line_timestamp(line).unwrap_or_default().to_string(),
            killer: killer.to_string(),
        };
        debug!("Vehicle destruction context: {:?}", context);
        state.last_vehicle_context = Some(context);
        Flow::Continue
    }

    fn apply_ship_spawn(
        &self,
        state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        let Some(token) = line.split_whitespace().nth(SPAWN_VEHICLE_TOKEN) else {
            warn!("Ship spawn line too short: {}", line.trim_end());
            return Flow::Continue;
        };
        let entity = markers::unwrap_token(token);
        if entity.is_empty() {
            return Flow::Continue;
        }

        let (ship, id) = markers::split_instance_suffix(entity);
        info!("Player has entered ship: {}", ship);
        state.enter_ship(ship, id);
        state.clear_vehicle_context();
        Flow::Continue
    }

    fn apply_ship_destroyed(
        &self,
        state: &mut SessionState,
        _line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        if state.active_ship.is_some() || state.active_ship_id.is_some() {
            info!(
                "Ship destroyed: {} with ID: {}",
                state.ship_used(),
                state.active_ship_id.as_deref().unwrap_or("N/A")
            );
        }
        state.clear_ship();
        Flow::Continue
    }

    fn apply_actor_stall(
        &self,
        _state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        if let (Some(log), Some(sighting)) =
            (&self.proximity, ProximitySighting::parse_actor_stall(line))
        {
            log.record(sighting);
        }
        Flow::Continue
    }

    fn apply_fake_hit(
        &self,
        _state: &mut SessionState,
        line: &str,
        _event: &mut Option<LineEvent>,
    ) -> Flow {
        if let (Some(log), Some(sighting)) =
            (&self.proximity, ProximitySighting::parse_fake_hit(line))
        {
            log.record(sighting);
        }
        Flow::Continue
    }
}

/// Parse `pos x: 1.0, y: 2.0, z: 3.0` from a vehicle destruction line
fn parse_position(line: &str) -> Option<Coordinates> {
    let start = line.find(POSITION_KEY)? + POSITION_KEY.len() - "x: ".len();
    let rest = &line[start..];

    let axis = |key: &str| -> Option<f64> {
        let raw = markers::value_after(rest, key, ',')?;
        raw.split_whitespace().next()?.trim_end_matches(']').parse().ok()
    };

    Some(Coordinates {
        x: axis("x: ")?,
        y: axis("y: ")?,
        z: axis("z: ")?,
    })
}

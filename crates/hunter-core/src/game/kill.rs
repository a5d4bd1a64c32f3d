//! Kill line parsing.
//!
//! Kill lines have a fixed shape:
//!
//! ```text
//! <2025-04-14T16:42:53.465Z> [Notice] <Actor Death> CActor::Kill: 'victim' [id] in zone 'zone'
//!     killed by 'killer' [id] using 'weapon' [Class x] with damage type 'Bullet' from direction ...
//! ```
//!
//! Values are taken from fixed whitespace-token positions. Anchor tokens are
//! checked first so a change in the game's format is reported instead of
//! silently producing garbage records.

use serde::Serialize;

use super::markers::{self, UNKNOWN_ACTOR};
use super::session::{SessionState, VehicleContext};
use super::timestamp::{clean_timestamp, parse_timestamp};
use crate::error::{Error, Result};

/// Token positions of the kill line format
pub mod layout {
    pub const TIME: usize = 0;
    pub const KILL_MARKER: usize = 4;
    pub const VICTIM: usize = 5;
    pub const ZONE: usize = 9;
    pub const KILLED: usize = 10;
    pub const BY: usize = 11;
    pub const KILLER: usize = 12;
    pub const USING: usize = 14;
    pub const WEAPON: usize = 15;
    pub const TYPE: usize = 20;
    pub const DAMAGE_TYPE: usize = 21;
    pub const MIN_TOKENS: usize = DAMAGE_TYPE + 1;
}

/// A kill made by the local player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillRecord {
    pub player: String,
    pub time: String,
    pub victim: String,
    pub killer: String,
    pub zone: String,
    pub weapon: String,
    pub damage_type: String,
    pub location: Option<String>,
    pub coordinates: Option<String>,
    pub game_mode: String,
    pub ship_used: String,
}

/// Outcome of parsing a well-formed kill line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedKill {
    Kill(KillRecord),
    /// Self-death, suicide, or a kill the game could not attribute
    Death,
}

struct KillFields<'a> {
    time: &'a str,
    victim: &'a str,
    zone: &'a str,
    killer: &'a str,
    weapon: &'a str,
    damage_type: &'a str,
}

fn tokenize(line: &str) -> Result<KillFields<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < layout::MIN_TOKENS {
        return Err(Error::malformed_kill(
            format!(
                "expected at least {} tokens, found {}",
                layout::MIN_TOKENS,
                tokens.len()
            ),
            line,
        ));
    }

    let anchors = [
        (layout::KILL_MARKER, "CActor::Kill:"),
        (layout::KILLED, "killed"),
        (layout::BY, "by"),
        (layout::USING, "using"),
        (layout::TYPE, "type"),
    ];
    for (index, expected) in anchors {
        if tokens[index] != expected {
            return Err(Error::malformed_kill(
                format!(
                    "token {} is '{}', expected '{}'",
                    index, tokens[index], expected
                ),
                line,
            ));
        }
    }

    let fields = KillFields {
        time: clean_timestamp(tokens[layout::TIME]),
        victim: markers::unquote(tokens[layout::VICTIM]),
        zone: markers::unquote(tokens[layout::ZONE]),
        killer: markers::unquote(tokens[layout::KILLER]),
        weapon: markers::unquote(tokens[layout::WEAPON]),
        damage_type: markers::unquote(tokens[layout::DAMAGE_TYPE]),
    };

    if fields.victim.is_empty() || fields.killer.is_empty() || fields.time.is_empty() {
        return Err(Error::malformed_kill("empty victim, killer or time", line));
    }

    Ok(fields)
}

/// Check whether the vehicle context can still describe a kill at `kill_time`
fn context_is_fresh(
    context: &VehicleContext,
    kill_time: &str,
    max_age: chrono::Duration,
) -> bool {
    match (parse_timestamp(&context.time), parse_timestamp(kill_time)) {
        (Some(context_time), Some(kill_time)) => {
            let age = kill_time - context_time;
            age >= -max_age && age <= max_age
        }
        _ => true,
    }
}

/// Parse a kill line seen by `player`
///
/// Returns `ParsedKill::Death` when the line describes the player's own
/// death, a suicide, or an unattributed kill.
pub fn parse_kill_line(
    line: &str,
    player: &str,
    state: &SessionState,
    context_max_age: chrono::Duration,
) -> Result<ParsedKill> {
    let fields = tokenize(line)?;

    if fields.victim == fields.killer
        || fields.killer.eq_ignore_ascii_case(UNKNOWN_ACTOR)
        || fields.victim == player
    {
        return Ok(ParsedKill::Death);
    }

    let context = state
        .last_vehicle_context
        .as_ref()
        .filter(|ctx| context_is_fresh(ctx, fields.time, context_max_age));

    Ok(ParsedKill::Kill(KillRecord {
        player: player.to_string(),
        time: fields.time.to_string(),
        victim: fields.victim.to_string(),
        killer: fields.killer.to_string(),
        zone: fields.zone.to_string(),
        weapon: fields.weapon.to_string(),
        damage_type: fields.damage_type.to_string(),
        location: context.map(|ctx| ctx.zone.clone()),
        coordinates: context.and_then(|ctx| ctx.coordinates.map(|c| c.to_string())),
        game_mode: state.game_mode.clone(),
        ship_used: state.ship_used().to_string(),
    }))
}

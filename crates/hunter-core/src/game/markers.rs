//! Literal markers recognised in the game log.
//!
//! The log format is not versioned by the game, so every marker the
//! classifier depends on lives here.

/// Session context line carrying `gamerules="<mode>"`
pub const CONTEXT_ESTABLISHER_DONE: &str = "<Context Establisher Done>";
pub const GAME_RULES_KEY: &str = "gamerules=";

/// Lobby / persistent-universe default mode
pub const DEFAULT_GAME_MODE: &str = "SC_Default";
/// Arena Commander free flight
pub const FREE_FLIGHT_GAME_MODE: &str = "EA_FreeFlight";

pub const CHARACTER_STATUS: &str = "AccountLoginCharacterStatus_Character";
pub const GEID_KEY: &str = "geid ";

pub const LOGIN_SUCCESS: &str = "<Legacy login response> [CIG-net] User Login Success";
pub const HANDLE_KEY: &str = "Handle[";

pub const ENTER_ZONE: &str = "OnEntityEnterZone";
pub const ENTITY_KEY: &str = "-> Entity ";

pub const ACTOR_KILL: &str = "CActor::Kill";

pub const VEHICLE_DESTRUCTION: &str = "<Vehicle Destruction>";
pub const ZONE_KEY: &str = "in zone '";
pub const POSITION_KEY: &str = "pos x: ";
pub const CAUSED_BY_KEY: &str = "caused by '";

pub const VEHICLE_SPAWNED: &str = "CPlayerShipRespawnManager::OnVehicleSpawned";
/// Whitespace token holding the spawned vehicle, e.g. `[AEGS_Gladius_3300]`
pub const SPAWN_VEHICLE_TOKEN: usize = 5;

pub const LOCAL_CLIENT_DEAD: &str = "<local client>: Entering control state dead";

pub const ACTOR_STALL: &str = "<Actor stall>";
pub const STALL_PLAYER_KEY: &str = "Player: ";

pub const FAKE_HIT: &str = "Fake hit FROM ";
pub const FAKE_HIT_TARGET_KEY: &str = " TO ";
pub const FAKE_HIT_CHILD_KEY: &str = "Being sent to child ";

/// Present in free-flight kill lines caused by a ship reset
pub const CRASH: &str = "Crash";

/// Kill lines containing any of these (case-insensitive) are NPC or
/// environmental kills.
pub const EXCLUDED_KILL_SUBSTRINGS: [&str; 5] =
    ["PU_Pilots", "NPC_Archetypes", "PU_Human", "kopion", "marok"];

/// Entity-name prefixes identifying a player ship
pub const SHIP_MANUFACTURERS: [&str; 17] = [
    "DRAK", "ORIG", "AEGS", "ANVL", "CRUS", "BANU", "MISC", "KRIG", "XNAA", "ARGO", "VNCL",
    "ESPR", "RSI", "CNOU", "GRIN", "TMBL", "GAMA",
];

/// Killer value the game uses when attribution failed
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Check whether a kill line names an excluded (non-player) actor
pub fn is_excluded_kill(line: &str) -> bool {
    let lower = line.to_lowercase();
    EXCLUDED_KILL_SUBSTRINGS
        .iter()
        .any(|s| lower.contains(&s.to_lowercase()))
}

/// Check whether an entity name belongs to a known ship manufacturer
pub fn is_ship_entity(name: &str) -> bool {
    SHIP_MANUFACTURERS.iter().any(|p| name.starts_with(p))
}

/// Split `ANVL_Hornet_F7A_Mk2_2677329226210` into the ship name and its
/// numeric instance id.
pub fn split_instance_suffix(entity: &str) -> (&str, Option<&str>) {
    match entity.rsplit_once('_') {
        Some((name, id)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(id))
        }
        _ => (entity, None),
    }
}

/// Return the text following `key`, up to (not including) `terminator`.
pub fn value_after<'a>(line: &'a str, key: &str, terminator: char) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let end = rest.find(terminator).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Strip one leading and one trailing quote character.
pub fn unquote(token: &str) -> &str {
    let token = token.strip_prefix('\'').unwrap_or(token);
    token.strip_suffix('\'').unwrap_or(token)
}

/// Strip a `[...]` or `'...'` wrapper from a token.
pub fn unwrap_token(token: &str) -> &str {
    let token = token.trim_end_matches([':', ',']);
    token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or_else(|| unquote(token))
}

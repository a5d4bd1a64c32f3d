use std::fmt;

use serde::Serialize;

use super::markers::DEFAULT_GAME_MODE;

/// Placeholder used on the wire for an absent ship
pub const NOT_AVAILABLE: &str = "N/A";

/// Game mode before any context line has been seen
pub const UNKNOWN_GAME_MODE: &str = "Nothing";

/// 3-axis position reported by a vehicle destruction line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}, z: {}", self.x, self.y, self.z)
    }
}

/// Location of the most recent vehicle destruction caused by the local player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleContext {
    pub zone: String,
    pub coordinates: Option<Coordinates>,
    pub time: String,
    pub killer: String,
}

/// Mutable state for one game session
///
/// Owned by whoever drives the classifier (a tailer or a replay run), so live
/// tracking and backup replay never observe each other's state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub game_mode: String,
    pub active_ship: Option<String>,
    pub active_ship_id: Option<String>,
    pub player_geid: Option<String>,
    pub last_vehicle_context: Option<VehicleContext>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            game_mode: UNKNOWN_GAME_MODE.to_string(),
            active_ship: None,
            active_ship_id: None,
            player_geid: None,
            last_vehicle_context: None,
        }
    }

    pub fn with_geid(geid: impl Into<String>) -> Self {
        Self {
            player_geid: Some(geid.into()),
            ..Self::new()
        }
    }

    pub fn is_default_mode(&self) -> bool {
        self.game_mode == DEFAULT_GAME_MODE
    }

    /// Ship name as reported to Servitor
    pub fn ship_used(&self) -> &str {
        self.active_ship.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn set_game_mode(&mut self, mode: &str) {
        if self.game_mode != mode {
            self.game_mode = mode.to_string();
        }
        if self.is_default_mode() {
            self.active_ship = None;
            self.active_ship_id = None;
        }
    }

    pub fn enter_ship(&mut self, ship: &str, id: Option<&str>) {
        self.active_ship = Some(ship.to_string());
        self.active_ship_id = id.map(str::to_string);
    }

    /// Ship destroyed or player dead: nothing from the old ship may carry over
    pub fn clear_ship(&mut self) {
        self.active_ship = None;
        self.active_ship_id = None;
        self.last_vehicle_context = None;
    }

    pub fn clear_vehicle_context(&mut self) {
        self.last_vehicle_context = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration and tuning constants.
//!
//! This module contains:
//! - `Config` - the TOML configuration file (Servitor endpoints, tracking and dedup tuning)
//! - Fixed capacities for the proximity histories
//! - Polling and network timing defaults

mod settings;

pub use settings::*;

/// Proximity history capacities.
pub mod limits {
    /// Maximum number of entries kept in the unified proximity history.
    pub const PROXIMITY_HISTORY_CAPACITY: usize = 100;

    /// Maximum number of fake-hit (interdiction) events kept for pinning.
    pub const FAKE_HIT_CAPACITY: usize = 10;

    /// Number of most recent entries inspected for burst suppression.
    pub const PROXIMITY_LOOKBACK: usize = 10;
}

/// Polling and network timing defaults.
pub mod timing {
    /// Sleep between tail polls when no new data is available.
    pub const TAIL_POLL_INTERVAL_MS: u64 = 1000;

    /// Upper bound for a single Servitor request.
    pub const HTTP_TIMEOUT_SECS: u64 = 15;

    /// Remote kills within this many seconds of a local kill are duplicates.
    pub const DEDUP_WINDOW_SECS: i64 = 60;

    /// Same-kind proximity events for one player closer than this are a burst.
    pub const PROXIMITY_DEDUP_SECS: i64 = 5;

    /// How long a fake hit stays pinned for the presentation layer.
    pub const FAKE_HIT_PIN_SECS: i64 = 30;

    /// Vehicle-destruction context older than this no longer enriches a kill.
    pub const VEHICLE_CONTEXT_MAX_AGE_SECS: i64 = 30;
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::timing;
use crate::error::{Error, Result};

/// Top-level configuration loaded from `config.toml`
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub servitor: ServitorConfig,
    pub tracking: TrackingConfig,
    pub dedup: DedupConfig,
    pub proximity: ProximityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServitorConfig {
    /// Endpoint receiving kill reports (POST)
    pub report_url: String,
    /// Endpoint returning the user's recorded kills (GET)
    pub history_url: String,
    /// Authorization value sent with every request
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Reported as `client_ver` in the kill payload
    pub client_version: String,
}

impl Default for ServitorConfig {
    fn default() -> Self {
        Self {
            report_url: String::new(),
            history_url: String::new(),
            api_key: None,
            timeout_secs: timing::HTTP_TIMEOUT_SECS,
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServitorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub poll_interval_ms: u64,
    pub vehicle_context_max_age_secs: i64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: timing::TAIL_POLL_INTERVAL_MS,
            vehicle_context_max_age_secs: timing::VEHICLE_CONTEXT_MAX_AGE_SECS,
        }
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn vehicle_context_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.vehicle_context_max_age_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub window_secs: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_secs: timing::DEDUP_WINDOW_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub dedup_window_secs: i64,
    pub fake_hit_pin_secs: i64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: timing::PROXIMITY_DEDUP_SECS,
            fake_hit_pin_secs: timing::FAKE_HIT_PIN_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParseError(e.to_string()))
    }

    /// Load the file if it exists, otherwise return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

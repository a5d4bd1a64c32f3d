use serde::Deserialize;
use tracing::{debug, info};

use super::{CredentialProvider, HttpClient};
use crate::config::ServitorConfig;
use crate::error::{Error, Result};

/// A kill already recorded by Servitor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteKill {
    pub victim: String,
    #[serde(alias = "time")]
    pub timestamp: String,
}

/// Source of a user's recorded kills
pub trait KillHistorySource: Send + Sync {
    fn fetch_kills(&self, user_id: &str) -> Result<Vec<RemoteKill>>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryResponse {
    List(Vec<RemoteKill>),
    Wrapped { kills: Vec<RemoteKill> },
}

/// History source backed by Servitor's kill listing
pub struct ServitorHistory<C> {
    client: HttpClient,
    history_url: String,
    credentials: C,
}

impl<C: CredentialProvider> ServitorHistory<C> {
    pub fn new(config: &ServitorConfig, credentials: C) -> Self {
        Self {
            client: HttpClient::new(config.timeout()),
            history_url: config.history_url.clone(),
            credentials,
        }
    }
}

impl<C: CredentialProvider> KillHistorySource for ServitorHistory<C> {
    fn fetch_kills(&self, user_id: &str) -> Result<Vec<RemoteKill>> {
        if self.history_url.is_empty() {
            return Err(Error::MissingEndpoint("history URL"));
        }
        let key = self
            .credentials
            .credential()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential)?;

        debug!("Fetching kill history for {}", user_id);
        let response: HistoryResponse =
            self.client
                .get_json(&self.history_url, &key, &[("user_id", user_id)])?;

        let kills = match response {
            HistoryResponse::List(kills) => kills,
            HistoryResponse::Wrapped { kills } => kills,
        };
        info!("Fetched {} recorded kills for {}", kills.len(), user_id);
        Ok(kills)
    }
}

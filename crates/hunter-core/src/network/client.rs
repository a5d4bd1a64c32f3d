use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Blocking JSON client for Servitor
///
/// Non-2xx statuses are returned to the caller instead of being mapped to
/// errors, so callers can tell a rejected key from a transport failure.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
        }
    }

    /// POST `body` as JSON with the raw `authorization` header, returning the status
    pub fn post_json<T: Serialize>(&self, url: &str, authorization: &str, body: &T) -> Result<u16> {
        debug!("POST {}", url);
        let response = self
            .agent
            .post(url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .send_json(body)?;

        Ok(response.status().as_u16())
    }

    /// GET `url` with query parameters and decode a 2xx JSON body
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        authorization: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET {}", url);
        let mut request = self.agent.get(url).header("Authorization", authorization);
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let mut response = request.call()?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(Error::Rejected(status));
        }

        Ok(response.body_mut().read_json::<T>()?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::timing::HTTP_TIMEOUT_SECS))
    }
}

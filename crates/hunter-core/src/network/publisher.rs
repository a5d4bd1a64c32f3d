use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::HttpClient;
use crate::config::ServitorConfig;
use crate::error::{Error, Result};
use crate::game::KillRecord;

const RSI_PROFILE_BASE: &str = "https://robertsspaceindustries.com/citizens/";

/// Delivers a kill record to the scoring service
pub trait KillPublisher: Send + Sync {
    fn publish(&self, record: &KillRecord) -> Result<()>;
}

/// Source of the API key sent with each request
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<String>;
}

impl CredentialProvider for String {
    fn credential(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl CredentialProvider for Option<String> {
    fn credential(&self) -> Option<String> {
        self.clone()
    }
}

/// API key that can be replaced while tailers are running
#[derive(Debug, Clone, Default)]
pub struct SharedCredential {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedCredential {
    pub fn new(key: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(key)),
        }
    }

    pub fn set(&self, key: Option<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = key;
    }
}

impl CredentialProvider for SharedCredential {
    fn credential(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// JSON body of a kill report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillPayload<'a> {
    pub player: &'a str,
    pub victim: &'a str,
    pub time: &'a str,
    pub zone: &'a str,
    pub location: Option<&'a str>,
    pub coordinates: Option<&'a str>,
    pub weapon: &'a str,
    pub rsi_profile: String,
    pub game_mode: &'a str,
    pub client_ver: &'a str,
    pub killers_ship: &'a str,
    pub damage_type: &'a str,
}

impl<'a> KillPayload<'a> {
    pub fn new(record: &'a KillRecord, client_version: &'a str) -> Self {
        Self {
            player: &record.player,
            victim: &record.victim,
            time: &record.time,
            zone: &record.zone,
            location: record.location.as_deref(),
            coordinates: record.coordinates.as_deref(),
            weapon: &record.weapon,
            rsi_profile: format!("{}{}", RSI_PROFILE_BASE, record.victim),
            game_mode: &record.game_mode,
            client_ver: client_version,
            killers_ship: &record.ship_used,
            damage_type: &record.damage_type,
        }
    }
}

/// Publisher posting kill reports to Servitor
pub struct ServitorPublisher<C> {
    client: HttpClient,
    report_url: String,
    client_version: String,
    credentials: C,
}

impl<C: CredentialProvider> ServitorPublisher<C> {
    pub fn new(config: &ServitorConfig, credentials: C) -> Self {
        Self {
            client: HttpClient::new(config.timeout()),
            report_url: config.report_url.clone(),
            client_version: config.client_version.clone(),
            credentials,
        }
    }
}

impl<C: CredentialProvider> KillPublisher for ServitorPublisher<C> {
    fn publish(&self, record: &KillRecord) -> Result<()> {
        let key = self
            .credentials
            .credential()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential)?;

        if self.report_url.is_empty() {
            return Err(Error::MissingEndpoint("report URL"));
        }

        let payload = KillPayload::new(record, &self.client_version);
        debug!("Kill payload: {:?}", payload);

        match self.client.post_json(&self.report_url, &key, &payload) {
            Ok(200 | 201) => {
                info!("Reported kill of {} to Servitor", record.victim);
                Ok(())
            }
            Ok(status) => {
                warn!("Servitor rejected kill of {} (HTTP {})", record.victim, status);
                Err(Error::Rejected(status))
            }
            Err(e) => {
                warn!("Failed to report kill of {}: {}", record.victim, e);
                Err(e)
            }
        }
    }
}

impl<P: KillPublisher + ?Sized> KillPublisher for Arc<P> {
    fn publish(&self, record: &KillRecord) -> Result<()> {
        (**self).publish(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn record() -> KillRecord {
        KillRecord {
            player: "DocHound".to_string(),
            time: "2025-04-14T16:42:53.465Z".to_string(),
            victim: "idkausername_27".to_string(),
            killer: "DocHound".to_string(),
            zone: "OOC_Stanton_2a_Cellin".to_string(),
            weapon: "lbco_pistol_energy_01_2698343630880".to_string(),
            damage_type: "Bullet".to_string(),
            location: None,
            coordinates: None,
            game_mode: "SC_Default".to_string(),
            ship_used: "N/A".to_string(),
        }
    }

    #[test]
    fn test_payload_fields() {
        let record = record();
        let payload = serde_json::to_value(KillPayload::new(&record, "0.3.0")).unwrap();

        assert_eq!(payload["player"], "DocHound");
        assert_eq!(payload["victim"], "idkausername_27");
        assert_eq!(payload["time"], "2025-04-14T16:42:53.465Z");
        assert_eq!(
            payload["rsi_profile"],
            "https://robertsspaceindustries.com/citizens/idkausername_27"
        );
        assert_eq!(payload["client_ver"], "0.3.0");
        assert_eq!(payload["killers_ship"], "N/A");
        assert_eq!(payload["damage_type"], "Bullet");
        assert!(payload["location"].is_null());
    }

    #[test]
    fn test_missing_credential_fails_without_io() {
        let config = ServitorConfig {
            report_url: "http://127.0.0.1:9/report".to_string(),
            ..Default::default()
        };
        let publisher = ServitorPublisher::new(&config, None::<String>);
        assert!(matches!(publisher.publish(&record()), Err(Error::MissingCredential)));

        let publisher = ServitorPublisher::new(&config, "   ".to_string());
        assert!(matches!(publisher.publish(&record()), Err(Error::MissingCredential)));
    }

    #[test]
    fn test_missing_endpoint() {
        let publisher = ServitorPublisher::new(&ServitorConfig::default(), "key".to_string());
        assert!(matches!(
            publisher.publish(&record()),
            Err(Error::MissingEndpoint(_))
        ));
    }

    /// Serve one request with `status` and return the URL to post to
    fn serve_once(status: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/report", listener.local_addr().unwrap());
        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            stream.write_all(reply.as_bytes()).unwrap();
            head + &String::from_utf8(body).unwrap()
        });
        (url, handle)
    }

    fn publisher_for(url: &str) -> ServitorPublisher<String> {
        let config = ServitorConfig {
            report_url: url.to_string(),
            ..Default::default()
        };
        ServitorPublisher::new(&config, "secret-key".to_string())
    }

    #[test]
    fn test_created_counts_as_success() {
        let (url, server) = serve_once("201 Created");
        publisher_for(&url).publish(&record()).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /report"));
        assert!(request.to_ascii_lowercase().contains("authorization: secret-key"));
        assert!(request.contains("\"victim\":\"idkausername_27\""));
    }

    #[test]
    fn test_server_error_is_rejected() {
        let (url, server) = serve_once("500 Internal Server Error");
        let result = publisher_for(&url).publish(&record());
        server.join().unwrap();
        assert!(matches!(result, Err(Error::Rejected(500))));
    }

    #[test]
    fn test_refused_connection_is_http_error() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}/report", port);
        let result = publisher_for(&url).publish(&record());
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn test_shared_credential_update() {
        let shared = SharedCredential::default();
        assert_eq!(shared.credential(), None);

        let handle = shared.clone();
        handle.set(Some("abc".to_string()));
        assert_eq!(shared.credential().as_deref(), Some("abc"));
    }
}

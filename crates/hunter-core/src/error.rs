use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Log file not found: {0}")]
    LogNotFound(String),

    #[error("Malformed kill line ({reason}): {line}")]
    MalformedKillLine { reason: String, line: String },

    #[error("Kill event will not be sent. Enter a valid key to establish connection with Servitor")]
    MissingCredential,

    #[error("No {0} configured")]
    MissingEndpoint(&'static str),

    #[error("Servitor rejected the request (HTTP {0}). Reconnect with a new key")]
    Rejected(u16),

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed_kill(reason: impl Into<String>, line: &str) -> Self {
        Error::MalformedKillLine {
            reason: reason.into(),
            line: line.trim_end().to_string(),
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        let message = match &e {
            ureq::Error::Timeout(_) => format!("Request timed out: {}", e),
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                format!("Connection failed: {}", e)
            }
            ureq::Error::StatusCode(status) => format!("HTTP {} error: {}", status, e),
            _ => format!("HTTP error: {}", e),
        };
        Error::Http(message)
    }
}

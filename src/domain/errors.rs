// Error taxonomy shared across the collection paths
use serde::Serialize;
use thiserror::Error;

/// Category attached to a degraded station record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Query,
    Parse,
    Timeout,
}

/// Per-location failure annotation. The location keeps its slot in the
/// aggregation result; this record accompanies whatever partial data was
/// obtained before the failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationError {
    pub location: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl AggregationError {
    pub fn new(location: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Backing-store query failure. `transient` marks failures worth a single
/// retry (transport errors, 5xx); malformed responses are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    pub status: Option<u16>,
    pub message: String,
    pub transient: bool,
}

impl QueryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            transient: true,
        }
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: format!("backing store returned status {}: {}", status, body.into()),
            transient: status >= 500,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            transient: false,
        }
    }
}

/// Startup-fatal failures: the process must not serve with a partially
/// loaded configuration or coordinate table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("failed to read coordinate table {path}: {source}")]
    CoordinateIo {
        path: String,
        source: std::io::Error,
    },

    #[error("coordinate table {path} is malformed: {source}")]
    CoordinateFormat {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Malformed live payload or unparseable timestamp. Always recoverable:
/// the affected message or field is dropped, surrounding state survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("payload is not valid json: {0}")]
    InvalidJson(String),

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("field `{0}` is not a number")]
    InvalidNumber(&'static str),

    #[error("unsupported timestamp format: {0}")]
    InvalidTimestamp(String),
}

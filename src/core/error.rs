// src/core/error.rs

use thiserror::Error;

/// Errors that abort an audit run.
///
/// Everything else (an unreachable robots.txt, a malformed JSON-LD block, a
/// failing provider) is encoded into the module results instead.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid score policy: {0}")]
    Policy(String),
}

/// Errors raised while loading `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AuditError {
    /// True when the error comes from the network rather than from the input.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AuditError::Fetch { .. } | AuditError::Status { .. } | AuditError::Body { .. }
        )
    }
}

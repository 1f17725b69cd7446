//! Error types for discovery and monitor lifecycle

use thiserror::Error;

/// Maximum response body accepted from the marathon API (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Cluster discovery error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response too large ({size} bytes, max 16 MiB)")]
    ResponseTooLarge { size: u64 },

    #[error("Could not start monitor for cluster {cluster}: {reason}")]
    MonitorStart { cluster: String, reason: String },
}

impl Error {
    /// Whether the failure came from talking to the orchestrator rather than
    /// from local configuration or a monitor.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::MalformedResponse(_) | Self::ResponseTooLarge { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Result type for cluster operations
pub type Result<T> = std::result::Result<T, Error>;

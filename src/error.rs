// Error types shared by the API client, the report writers and the config
// layer. Each remote call returns its own `Result` so the pipeline can tell
// a network failure from a bad status or a local disk problem.

use reqwest::StatusCode;
use std::path::PathBuf;

/// Failure of a single exchange with the scanning service or of a local
/// file operation performed on its behalf.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upload response did not contain a file hash")]
    MissingHash,

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the service answered but with a non-success status.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Problems with the values supplied on the command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API URL missing")]
    MissingApiUrl,

    #[error("API key missing")]
    MissingApiKey,

    #[error("API URL must start with http:// or https://, got {0}")]
    InvalidApiUrl(String),
}

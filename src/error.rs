//! Typed errors for the data-source boundary and the query façade.
//!
//! Only failures of the data source are errors. "Nothing matched" is an
//! empty result and a link that cannot be resolved is passed through, so
//! neither appears here.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the catalog from wherever it lives.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed catalog: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Short message suitable for showing next to a retry button.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::Timeout { .. } => "Request timeout - please try again".to_string(),
            SourceError::Status { status: 404, .. } => "Data not found".to_string(),
            SourceError::Status { status, .. } if *status >= 500 => {
                "Server error - please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error returned by [`QueryFacade`](crate::facade::QueryFacade).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The catalog could not be loaded. Never reported as an empty result.
    #[error("{message}")]
    Transport { message: String },
}

impl From<SourceError> for QueryError {
    fn from(err: SourceError) -> Self {
        QueryError::Transport {
            message: err.user_message(),
        }
    }
}

//! Error types for the search engine client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SearchBackendError>;

/// Failures talking to the search engine. None of them are retried here.
#[derive(Error, Debug)]
pub enum SearchBackendError {
    #[error("Search engine unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Search engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed search engine response: {0}")]
    Malformed(String),

    #[error("Invalid search engine configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SearchBackendError {
    fn from(err: serde_json::Error) -> Self {
        SearchBackendError::Malformed(err.to_string())
    }
}

//! Error types for the garage API client

use thiserror::Error;

/// Errors that can occur when talking to the garage backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend answered with a non-success status
    #[error("Token rejected with status {status}")]
    Rejected { status: u16 },

    /// The request never produced a response (DNS, connect, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured base URL or path is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::Rejected {
                status: status.as_u16(),
            },
            None => ClientError::Transport(err.to_string()),
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

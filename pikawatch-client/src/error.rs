//! Error types for the metrics client.

use thiserror::Error;

/// Errors that can occur when querying the Pika Monitor backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The query parameters do not describe a single time window.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// HTTP request failed or returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed; the session token has been cleared.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The agent or monitor does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

//! Error types for the client crate.

use thiserror::Error;

/// Errors from talking to the field catalog or the search endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not the expected JSON.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configuration value could not be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidConfig {
        name: String,
        value: String,
        reason: String,
    },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

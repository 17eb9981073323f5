//! NMS client errors

use thiserror::Error;

/// Errors that can occur when interacting with the NMS API
#[derive(Debug, Error)]
pub enum NmsError {
    /// HTTP request/response error (connection refused, TLS failure, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NMS API returned an error status
    #[error("NMS API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (missing, expired or rejected token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid client configuration (e.g. unparsable CA certificate)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

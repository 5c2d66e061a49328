//! Error types for the CDP client

use cdp_types::CdpError;
use thiserror::Error;

/// Errors that can occur in the CDP client
#[derive(Error, Debug)]
pub enum CdpClientError {
    /// No usable debugging target was advertised by the endpoint
    #[error("Endpoint discovery failed: {0}")]
    Discovery(String),

    /// HTTP error while querying the endpoint metadata
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error (boxed to reduce size)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The connection is closed
    #[error("Connection is closed")]
    ConnectionClosed,

    /// The endpoint rejected a command
    #[error("Command rejected: {0}")]
    Command(#[source] CdpError),
}

/// Result type for CDP client operations
pub type Result<T> = std::result::Result<T, CdpClientError>;

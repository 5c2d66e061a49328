//! Error types for trace sessions

use cdp_client::CdpClientError;
use thiserror::Error;

/// Errors that can occur while driving a trace session
///
/// Each variant names the phase that failed; dump failures and reported
/// data loss are warnings, not errors, and never appear here.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Could not reach the remote debugging endpoint
    #[error("Connection failed: {0}")]
    Connect(#[source] CdpClientError),

    /// Could not subscribe to a tracing notification
    #[error("Subscription to {0} failed: {1}")]
    Subscribe(String, #[source] CdpClientError),

    /// The endpoint rejected a tracing command
    #[error("Command {method} failed: {source}")]
    Command {
        /// The rejected method
        method: String,
        /// The underlying client error
        #[source]
        source: CdpClientError,
    },

    /// The notification stream ended before tracing completed
    #[error("Event stream closed before tracing completed")]
    Stream,

    /// The captured trace could not be written to its destination
    #[error("Trace output write failed: {0}")]
    Write(#[from] std::io::Error),
}

impl SessionError {
    /// Tag a client error with the command that was rejected
    pub fn command(method: impl Into<String>, source: CdpClientError) -> Self {
        SessionError::Command {
            method: method.into(),
            source,
        }
    }
}

/// Result type for trace session operations
pub type Result<T> = std::result::Result<T, SessionError>;

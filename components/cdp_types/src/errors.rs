// CDP Error types
// Implements the JSON-RPC 2.0 error object carried in CDP responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// CDP Error following JSON-RPC 2.0 error specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CdpError {
    /// Error code (JSON-RPC standard codes)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for CdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDP Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for CdpError {}

impl CdpError {
    /// Create a new CDP error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

// CDP protocol message framing and domain payloads
//
// Shared by the client transport and the tracing session layer.

pub mod domains;
pub mod errors;

// Re-export commonly used types
pub use errors::CdpError;

use serde::{Deserialize, Serialize};

/// CDP Request message
/// Sent by the client to invoke a method on the remote endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdpRequest {
    /// Unique identifier for this request
    pub id: u64,
    /// Method name in format "Domain.method"
    pub method: String,
    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl CdpRequest {
    /// Create a new request
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

/// CDP Response message
/// Carries the result or error for a previously issued request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdpResponse {
    /// Request ID this response corresponds to
    pub id: u64,
    /// Result of the method call (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error information (if method failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<errors::CdpError>,
}

/// CDP Event message
/// An unsolicited notification from the remote endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdpEvent {
    /// Event name in format "Domain.event"
    pub method: String,
    /// Event parameters
    pub params: serde_json::Value,
}

/// Generic CDP Message that can be request, response, or event
/// Useful for parsing incoming messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    /// A request message (has id and method)
    Request(CdpRequest),
    /// A response message (has id and result/error)
    Response(CdpResponse),
    /// An event message (has method but no id)
    Event(CdpEvent),
}

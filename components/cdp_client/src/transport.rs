//! Message framing for the CDP wire protocol

use crate::error::Result;
use cdp_types::{CdpMessage, CdpRequest};

/// Parse a CDP message from a JSON text frame
pub fn parse_cdp_message(json: &str) -> Result<CdpMessage> {
    let message = serde_json::from_str(json)?;
    Ok(message)
}

/// Serialize a CDP request to a JSON text frame
pub fn serialize_cdp_request(request: &CdpRequest) -> Result<String> {
    let json = serde_json::to_string(request)?;
    Ok(json)
}

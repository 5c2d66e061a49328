//! WebSocket client for the Chrome DevTools Protocol
//!
//! This module provides the protocol connection used by the tracing session
//! layer: endpoint discovery over the debugging endpoint's HTTP metadata
//! surface, command dispatch with response correlation, and subscription
//! streams for unsolicited events.
//!
//! # Example
//!
//! ```no_run
//! use cdp_client::{CdpClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let client = CdpClient::connect(&config).await?;
//!     let result = client.issue_command("Tracing.getCategories", None).await?;
//!     println!("{}", result);
//!     client.close();
//!     Ok(())
//! }
//! ```

// Public modules
pub mod client;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod transport;

// Re-export main types
pub use client::CdpClient;
pub use config::ClientConfig;
pub use connection::{CdpConnection, EventStream};
pub use discovery::discover_ws_url;
pub use error::{CdpClientError, Result};
pub use transport::{parse_cdp_message, serialize_cdp_request};

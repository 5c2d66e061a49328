//! Protocol connection seam
//!
//! The tracing session layer only needs three capabilities from the
//! connection: issue a command, subscribe to an event class, and close.
//! Expressing them as a trait keeps the session logic testable against
//! scripted connections.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Ordered stream of event params for one subscribed event class
pub type EventStream = mpsc::UnboundedReceiver<Value>;

/// Capability set the session layer requires from a protocol connection
#[async_trait]
pub trait CdpConnection: Send + Sync {
    /// Issue a command and wait for its result
    ///
    /// Resolves with the `result` payload on success or the endpoint's
    /// error payload on rejection.
    async fn issue_command(&self, method: &str, params: Option<Value>) -> Result<Value>;

    /// Subscribe to an event class
    ///
    /// Event params are delivered in arrival order. The stream ends when
    /// the connection closes. Fails if the connection is already closed.
    async fn subscribe(&self, method: &str) -> Result<EventStream>;

    /// Close the connection
    ///
    /// Idempotent; pending commands fail and event streams end.
    async fn close(&self);
}

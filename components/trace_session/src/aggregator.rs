//! Ordered accumulation of streamed trace events

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Append-only accumulator for trace-event batches
///
/// Batches are kept in arrival order. Sealing the buffer consumes the
/// aggregator, so nothing can be appended after finalization.
#[derive(Debug, Default)]
pub struct EventAggregator {
    events: Vec<Value>,
}

impl EventAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one batch of raw event records
    pub fn append(&mut self, batch: Vec<Value>) {
        self.events.extend(batch);
    }

    /// Number of events collected so far
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been collected yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Seal the collected events into an immutable buffer
    pub fn finalize(self) -> EventBuffer {
        EventBuffer {
            trace_events: self.events,
        }
    }
}

/// Completed capture in the format trace viewers consume
///
/// Serializes as `{"traceEvents": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventBuffer {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<Value>,
}

impl EventBuffer {
    /// Event records in arrival order
    pub fn events(&self) -> &[Value] {
        &self.trace_events
    }

    /// Number of captured events
    pub fn len(&self) -> usize {
        self.trace_events.len()
    }

    /// Whether the capture is empty
    pub fn is_empty(&self) -> bool {
        self.trace_events.is_empty()
    }
}

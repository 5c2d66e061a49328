//! Trace session configuration

use cdp_types::domains::tracing::{
    DumpTrigger, MemoryDumpConfig, MemoryDumpMode, TraceConfigParams, MEMORY_INFRA_CATEGORY,
};
use serde_json::{json, Value};
use std::time::Duration;

use crate::output::OutputDestination;

/// Immutable description of one tracing session
///
/// The configuration is never mutated once a session starts; the effective
/// category filter is derived when the start parameters are built.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Categories to record (empty means no filter)
    pub included_categories: Vec<String>,

    /// Categories to suppress
    pub excluded_categories: Vec<String>,

    /// Whether to collect systrace events alongside trace events
    pub enable_systrace: bool,

    /// Level of detail for periodic memory dumps, if enabled
    pub memory_dump_mode: Option<MemoryDumpMode>,

    /// Interval between periodic memory dumps
    pub memory_dump_interval: Duration,

    /// Whether to request one final dump right before stopping
    pub dump_memory_at_stop: bool,

    /// Where the completed trace is written
    pub destination: OutputDestination,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            included_categories: Vec::new(),
            excluded_categories: Vec::new(),
            enable_systrace: false,
            memory_dump_mode: None,
            memory_dump_interval: Duration::from_millis(2000),
            dump_memory_at_stop: false,
            destination: OutputDestination::Stdout,
        }
    }
}

impl TraceConfig {
    /// Set the categories to record
    pub fn with_included_categories(mut self, categories: Vec<String>) -> Self {
        self.included_categories = categories;
        self
    }

    /// Set the categories to suppress
    pub fn with_excluded_categories(mut self, categories: Vec<String>) -> Self {
        self.excluded_categories = categories;
        self
    }

    /// Enable or disable systrace collection
    pub fn with_systrace(mut self, enable: bool) -> Self {
        self.enable_systrace = enable;
        self
    }

    /// Enable periodic memory dumps at this level of detail
    pub fn with_memory_dumps(mut self, mode: MemoryDumpMode) -> Self {
        self.memory_dump_mode = Some(mode);
        self
    }

    /// Set the interval between periodic memory dumps
    pub fn with_memory_dump_interval(mut self, interval: Duration) -> Self {
        self.memory_dump_interval = interval;
        self
    }

    /// Request one final dump right before stopping
    pub fn with_dump_at_stop(mut self, dump: bool) -> Self {
        self.dump_memory_at_stop = dump;
        self
    }

    /// Set the output destination
    pub fn with_destination(mut self, destination: OutputDestination) -> Self {
        self.destination = destination;
        self
    }

    /// Effective category filter for this session
    ///
    /// Memory dumps require the memory-infra category to be recorded, so
    /// enabling dumps appends it; an unconstrained filter is widened to
    /// match-all first so the capture is not narrowed to memory-infra alone.
    pub fn effective_included_categories(&self) -> Vec<String> {
        let mut categories = self.included_categories.clone();
        if self.memory_dump_mode.is_some() {
            if categories.is_empty() {
                categories.push("*".to_string());
            }
            if !categories.iter().any(|c| c == MEMORY_INFRA_CATEGORY) {
                categories.push(MEMORY_INFRA_CATEGORY.to_string());
            }
        }
        categories
    }

    /// Parameters for the Tracing.start command
    pub fn start_params(&self) -> Value {
        let trace_config = TraceConfigParams {
            included_categories: self.effective_included_categories(),
            excluded_categories: self.excluded_categories.clone(),
            enable_systrace: self.enable_systrace,
            memory_dump_config: self.memory_dump_mode.map(|mode| MemoryDumpConfig {
                triggers: vec![DumpTrigger {
                    mode,
                    periodic_interval_ms: self.memory_dump_interval.as_millis() as u64,
                }],
            }),
        };

        json!({
            "traceConfig": trace_config,
            "streamFormat": "json",
        })
    }
}

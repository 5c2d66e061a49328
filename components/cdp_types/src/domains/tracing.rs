// Tracing domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reserved category that must be enabled for memory-infra dumps
pub const MEMORY_INFRA_CATEGORY: &str = "disabled-by-default-memory-infra";

/// Level of detail for memory dumps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemoryDumpMode {
    /// Cheapest dumps, suitable for always-on collection
    Background,
    /// Totals only
    Light,
    /// Full allocator breakdowns
    Detailed,
}

impl MemoryDumpMode {
    /// Wire representation of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryDumpMode::Background => "background",
            MemoryDumpMode::Light => "light",
            MemoryDumpMode::Detailed => "detailed",
        }
    }
}

impl fmt::Display for MemoryDumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a memory dump mode string is not recognized
#[derive(Debug, Error)]
#[error("Unknown memory dump mode '{0}' (expected background, light, or detailed)")]
pub struct ParseDumpModeError(String);

impl FromStr for MemoryDumpMode {
    type Err = ParseDumpModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "background" => Ok(MemoryDumpMode::Background),
            "light" => Ok(MemoryDumpMode::Light),
            "detailed" => Ok(MemoryDumpMode::Detailed),
            other => Err(ParseDumpModeError(other.to_string())),
        }
    }
}

/// Trace configuration passed to Tracing.start
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceConfigParams {
    /// Category filters to record
    pub included_categories: Vec<String>,
    /// Category filters to suppress
    pub excluded_categories: Vec<String>,
    /// Whether to collect systrace events alongside trace events
    pub enable_systrace: bool,
    /// Memory dump trigger configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_dump_config: Option<MemoryDumpConfig>,
}

/// Memory dump triggers embedded in the trace configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryDumpConfig {
    /// Periodic dump triggers
    pub triggers: Vec<DumpTrigger>,
}

/// One periodic memory dump trigger
///
/// The trigger dictionary keeps the snake_case keys the trace backend
/// expects, unlike the camelCase CDP-level fields around it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DumpTrigger {
    /// Dump level of detail
    pub mode: MemoryDumpMode,
    /// Interval between dumps in milliseconds
    pub periodic_interval_ms: u64,
}

/// Parameters of the Tracing.dataCollected event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataCollectedParams {
    /// Batch of raw trace event records
    pub value: Vec<serde_json::Value>,
}

/// Parameters of the Tracing.tracingComplete event
///
/// Older endpoints misspell the data-loss field; both spellings are
/// accepted on the way in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TracingCompleteParams {
    /// Whether the endpoint dropped events during collection
    #[serde(default, alias = "dataLossOcurred")]
    pub data_loss_occurred: bool,
}

/// Result payload of Tracing.requestMemoryDump
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DumpOutcome {
    /// Identifier assigned to the dump by the endpoint
    pub dump_guid: String,
    /// Whether the dump succeeded
    pub success: bool,
}

/// Result payload of Tracing.getCategories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetCategoriesResult {
    /// Supported trace categories
    pub categories: Vec<String>,
}

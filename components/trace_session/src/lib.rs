//! Trace session orchestration for remote-debugging endpoints
//!
//! This module owns the lifecycle of one tracing session over a CDP
//! connection: configure and start tracing, stream event batches into an
//! ordered buffer, interleave periodic memory dumps, and on termination
//! flush the capture to its destination exactly once.
//!
//! # Example
//!
//! ```no_run
//! use cdp_client::ClientConfig;
//! use trace_session::{SessionController, TraceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TraceConfig::default().with_included_categories(vec!["v8".to_string()]);
//!     let controller = SessionController::new(config);
//!     let report = controller
//!         .capture(&ClientConfig::default(), async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     eprintln!("Captured {} events", report.events);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

// Public modules
pub mod aggregator;
pub mod categories;
pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod scheduler;

// Re-export main types
pub use aggregator::{EventAggregator, EventBuffer};
pub use categories::list_categories;
pub use config::TraceConfig;
pub use controller::{SessionController, SessionReport, SessionState};
pub use error::{Result, SessionError};
pub use output::{write_trace, OutputDestination};
pub use scheduler::{request_memory_dump, MemoryDumpScheduler};

// Protocol-level types callers need when configuring sessions
pub use cdp_types::domains::tracing::{DumpOutcome, MemoryDumpMode, MEMORY_INFRA_CATEGORY};

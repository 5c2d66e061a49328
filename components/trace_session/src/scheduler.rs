//! Periodic memory dump scheduling

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use cdp_client::CdpConnection;
use cdp_types::domains::tracing::{DumpOutcome, MemoryDumpMode};

use crate::error::{Result, SessionError};

/// Ask the endpoint for a single memory dump at the given level of detail
pub async fn request_memory_dump(
    conn: &dyn CdpConnection,
    mode: MemoryDumpMode,
) -> Result<DumpOutcome> {
    let params = json!({ "levelOfDetail": mode.as_str() });
    let result = conn
        .issue_command("Tracing.requestMemoryDump", Some(params))
        .await
        .map_err(|e| SessionError::command("Tracing.requestMemoryDump", e))?;
    let outcome: DumpOutcome = serde_json::from_value(result)
        .map_err(|e| SessionError::command("Tracing.requestMemoryDump", e.into()))?;
    Ok(outcome)
}

/// Fires memory dump requests at a fixed interval while tracing is active
///
/// Each tick issues its dump on a detached task, so one slow dump never
/// delays the next. Stopping cancels the timer only; a dump already in
/// flight runs to completion.
pub struct MemoryDumpScheduler {
    conn: Arc<dyn CdpConnection>,
    mode: MemoryDumpMode,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryDumpScheduler {
    /// Create a scheduler; no dumps fire until [`start`](Self::start)
    pub fn new(conn: Arc<dyn CdpConnection>, mode: MemoryDumpMode, interval: Duration) -> Self {
        Self {
            conn,
            mode,
            interval,
            timer: Mutex::new(None),
        }
    }

    /// Begin firing dumps, the first after one full interval
    ///
    /// Calling start on a running scheduler is a no-op.
    pub fn start(&self) {
        let mut timer = self.timer.lock();
        if timer.is_some() {
            return;
        }

        let conn = Arc::clone(&self.conn);
        let mode = self.mode;
        let period = self.interval;
        *timer = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                let conn = Arc::clone(&conn);
                tokio::spawn(async move {
                    match request_memory_dump(conn.as_ref(), mode).await {
                        Ok(outcome) if outcome.success => {
                            debug!("Periodic memory dump completed: {}", outcome.dump_guid);
                        }
                        Ok(outcome) => {
                            warn!("Periodic memory dump failed: {}", outcome.dump_guid);
                        }
                        Err(e) => {
                            warn!("Periodic memory dump request error: {}", e);
                        }
                    }
                });
            }
        }));
        debug!("Memory dump scheduler started ({:?} interval)", self.interval);
    }

    /// Cancel the timer; dumps already in flight are unaffected
    ///
    /// Stopping a stopped scheduler is a no-op.
    pub fn stop(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
            debug!("Memory dump scheduler stopped");
        }
    }

    /// Whether the timer is currently armed
    pub fn is_running(&self) -> bool {
        self.timer.lock().is_some()
    }
}

impl Drop for MemoryDumpScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Trace session lifecycle
//!
//! A session walks a fixed path: connect, subscribe to the tracing events,
//! start the trace, collect batches until the endpoint reports completion,
//! then write the buffer out. The controller owns that path and serializes
//! every step on one task, so no locking is needed around session state.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use cdp_client::{CdpClient, CdpConnection, ClientConfig};
use cdp_types::domains::tracing::{DataCollectedParams, TracingCompleteParams};

use crate::aggregator::EventAggregator;
use crate::config::TraceConfig;
use crate::error::{Result, SessionError};
use crate::output;
use crate::scheduler::{request_memory_dump, MemoryDumpScheduler};

/// Lifecycle phase of a trace session
///
/// `Failed` is terminal; a controller is consumed by
/// [`capture`](SessionController::capture), so no session runs twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet connected
    Idle,
    /// Resolving the endpoint and opening the socket
    Connecting,
    /// Subscribed, issuing Tracing.start
    Starting,
    /// Trace running, collecting event batches
    Active,
    /// Stop requested, waiting for the endpoint to flush
    Draining,
    /// Trace written and connection closed
    Closed,
    /// An unrecoverable error ended the session
    Failed,
}

/// Summary of a completed capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Number of trace events written
    pub events: usize,
    /// Whether the endpoint reported losing trace data
    pub data_loss: bool,
}

/// Drives one trace capture from start to finish
pub struct SessionController {
    config: TraceConfig,
    state: SessionState,
}

impl SessionController {
    /// Create a controller for one capture with the given configuration
    pub fn new(config: TraceConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle phase
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn set_state(&mut self, next: SessionState) {
        debug!("Session state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Connect to the endpoint and run the capture until `interrupt`
    /// resolves or the endpoint finishes on its own
    pub async fn capture<F>(
        mut self,
        client_config: &ClientConfig,
        interrupt: F,
    ) -> Result<SessionReport>
    where
        F: Future<Output = ()> + Send,
    {
        self.set_state(SessionState::Connecting);
        let client = match CdpClient::connect(client_config).await {
            Ok(client) => client,
            Err(e) => {
                self.set_state(SessionState::Failed);
                return Err(SessionError::Connect(e));
            }
        };
        self.capture_with(Arc::new(client), interrupt).await
    }

    /// Run the capture over an established connection
    ///
    /// The connection is closed when the capture ends, whatever the outcome.
    pub async fn capture_with<F>(
        mut self,
        conn: Arc<dyn CdpConnection>,
        interrupt: F,
    ) -> Result<SessionReport>
    where
        F: Future<Output = ()> + Send,
    {
        let result = self.run(&conn, interrupt).await;
        conn.close().await;
        match result {
            Ok(report) => {
                self.set_state(SessionState::Closed);
                Ok(report)
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                Err(e)
            }
        }
    }

    async fn run<F>(
        &mut self,
        conn: &Arc<dyn CdpConnection>,
        interrupt: F,
    ) -> Result<SessionReport>
    where
        F: Future<Output = ()> + Send,
    {
        // Subscribe before Tracing.start so no event can slip past.
        let mut data_rx = conn
            .subscribe("Tracing.dataCollected")
            .await
            .map_err(|e| SessionError::Subscribe("Tracing.dataCollected".into(), e))?;
        let mut complete_rx = conn
            .subscribe("Tracing.tracingComplete")
            .await
            .map_err(|e| SessionError::Subscribe("Tracing.tracingComplete".into(), e))?;

        self.set_state(SessionState::Starting);

        let included = self.config.effective_included_categories();
        if !included.is_empty() {
            info!("Included categories: {}", included.join(", "));
        }
        if !self.config.excluded_categories.is_empty() {
            info!(
                "Excluded categories: {}",
                self.config.excluded_categories.join(", ")
            );
        }
        if self.config.enable_systrace {
            info!("Systrace enabled");
        }
        if let Some(mode) = self.config.memory_dump_mode {
            info!(
                "Memory dumps enabled ({} every {:?})",
                mode, self.config.memory_dump_interval
            );
        }

        let params = self.config.start_params();
        debug!("Tracing.start params: {}", params);
        conn.issue_command("Tracing.start", Some(params))
            .await
            .map_err(|e| SessionError::command("Tracing.start", e))?;

        let mut scheduler = self.config.memory_dump_mode.map(|mode| {
            let scheduler =
                MemoryDumpScheduler::new(Arc::clone(conn), mode, self.config.memory_dump_interval);
            scheduler.start();
            scheduler
        });

        self.set_state(SessionState::Active);

        let mut aggregator = EventAggregator::new();
        tokio::pin!(interrupt);
        let mut interrupted = false;
        let data_loss;

        loop {
            tokio::select! {
                biased;

                maybe_batch = data_rx.recv() => match maybe_batch {
                    Some(batch) => collect_batch(&mut aggregator, batch),
                    None => return Err(SessionError::Stream),
                },

                maybe_complete = complete_rx.recv() => match maybe_complete {
                    Some(params) => {
                        let complete: TracingCompleteParams =
                            serde_json::from_value(params).unwrap_or_default();
                        if !interrupted {
                            warn!("Tracing completed without a stop request");
                            if let Some(scheduler) = scheduler.take() {
                                scheduler.stop();
                            }
                            self.set_state(SessionState::Draining);
                        }
                        data_loss = complete.data_loss_occurred;
                        break;
                    }
                    None => return Err(SessionError::Stream),
                },

                _ = &mut interrupt, if !interrupted => {
                    interrupted = true;
                    self.set_state(SessionState::Draining);
                    info!("Interrupt received, stopping trace");
                    if let Some(scheduler) = scheduler.take() {
                        scheduler.stop();
                    }
                    if self.config.dump_memory_at_stop {
                        if let Some(mode) = self.config.memory_dump_mode {
                            match request_memory_dump(conn.as_ref(), mode).await {
                                Ok(outcome) if outcome.success => {
                                    info!("Final memory dump completed: {}", outcome.dump_guid);
                                }
                                Ok(outcome) => {
                                    warn!("Final memory dump failed: {}", outcome.dump_guid);
                                }
                                Err(e) => {
                                    warn!("Final memory dump request error: {}", e);
                                }
                            }
                        }
                    }
                    conn.issue_command("Tracing.end", None)
                        .await
                        .map_err(|e| SessionError::command("Tracing.end", e))?;
                }
            }
        }

        // Batches queued behind the completion event still belong to the trace.
        while let Ok(batch) = data_rx.try_recv() {
            collect_batch(&mut aggregator, batch);
        }

        if data_loss {
            warn!("Endpoint reported trace data loss");
        }

        let buffer = aggregator.finalize();
        debug!("Collected {} trace events", buffer.len());
        output::write_trace(&buffer, &self.config.destination)?;

        Ok(SessionReport {
            events: buffer.len(),
            data_loss,
        })
    }
}

fn collect_batch(aggregator: &mut EventAggregator, params: Value) {
    match serde_json::from_value::<DataCollectedParams>(params) {
        Ok(batch) => {
            debug!("Received {} trace events", batch.value.len());
            aggregator.append(batch.value);
        }
        Err(e) => warn!("Malformed dataCollected payload: {}", e),
    }
}

//! CDP WebSocket client implementation

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::connection::{CdpConnection, EventStream};
use crate::discovery::discover_ws_url;
use crate::error::{CdpClientError, Result};
use crate::transport::{parse_cdp_message, serialize_cdp_request};
use cdp_types::{CdpMessage, CdpRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingCommands = Arc<DashMap<u64, oneshot::Sender<Result<Value>>>>;
type Subscriptions = Arc<DashMap<String, mpsc::UnboundedSender<Value>>>;

/// Asynchronous client for one CDP WebSocket connection
///
/// Commands are correlated to responses by sequential id; unsolicited
/// events are routed to at most one subscriber per event class. Two
/// background tasks pump the socket: a writer fed by an internal queue
/// and a reader that routes incoming frames.
pub struct CdpClient {
    /// Next request id
    next_id: AtomicU64,

    /// Commands awaiting a response, keyed by request id
    pending: PendingCommands,

    /// Event subscribers, keyed by event method
    subscriptions: Subscriptions,

    /// Queue feeding the writer task
    outgoing: mpsc::UnboundedSender<Message>,

    /// Whether the connection has been closed (locally or by the endpoint)
    closed: Arc<AtomicBool>,
}

impl CdpClient {
    /// Connect to the endpoint described by `config`
    ///
    /// Discovers the WebSocket debugger URL over the endpoint's HTTP
    /// metadata surface, then performs the WebSocket handshake.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let url = discover_ws_url(config).await?;
        Self::connect_url(&url).await
    }

    /// Connect directly to a known WebSocket debugger URL
    pub async fn connect_url(url: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(url).await.map_err(Box::new)?;
        debug!("WebSocket connection established to {}", url);

        let (write, read) = ws_stream.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        let pending: PendingCommands = Arc::new(DashMap::new());
        let subscriptions: Subscriptions = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(write_loop(write, outgoing_rx));
        tokio::spawn(read_loop(
            read,
            Arc::clone(&pending),
            Arc::clone(&subscriptions),
            Arc::clone(&closed),
            outgoing_tx.clone(),
        ));

        Ok(Self {
            next_id: AtomicU64::new(1),
            pending,
            subscriptions,
            outgoing: outgoing_tx,
            closed,
        })
    }

    /// Issue a command and wait for the endpoint's response
    pub async fn issue_command(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CdpClientError::ConnectionClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest::new(id, method, params);
        let text = serialize_cdp_request(&request)?;

        // Register before sending so the response cannot race the insert
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        debug!("Issuing {} (id {})", method, id);
        if self.outgoing.send(Message::Text(text)).is_err() {
            self.pending.remove(&id);
            return Err(CdpClientError::ConnectionClosed);
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(CdpClientError::ConnectionClosed),
        }
    }

    /// Subscribe to an event class
    ///
    /// At most one subscriber per event class; a later subscription
    /// replaces the earlier one.
    pub fn subscribe(&self, method: &str) -> Result<EventStream> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CdpClientError::ConnectionClosed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions.insert(method.to_string(), tx);
        debug!("Subscribed to {}", method);
        Ok(rx)
    }

    /// Close the connection
    ///
    /// Idempotent. Commands issued after this call fail immediately;
    /// commands still in flight fail once the socket shuts down.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Closing connection");
        let _ = self.outgoing.send(Message::Close(None));
    }

    /// Whether the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CdpConnection for CdpClient {
    async fn issue_command(&self, method: &str, params: Option<Value>) -> Result<Value> {
        CdpClient::issue_command(self, method, params).await
    }

    async fn subscribe(&self, method: &str) -> Result<EventStream> {
        CdpClient::subscribe(self, method)
    }

    async fn close(&self) {
        CdpClient::close(self);
    }
}

/// Drain the outgoing queue into the socket
async fn write_loop(mut write: SplitSink<WsStream, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = rx.recv().await {
        let is_close = matches!(message, Message::Close(_));
        if let Err(e) = write.send(message).await {
            debug!("WebSocket send failed: {}", e);
            break;
        }
        if is_close {
            break;
        }
    }
    debug!("Writer stopped");
}

/// Route incoming frames until the socket shuts down, then fail whatever
/// is still pending
async fn read_loop(
    mut read: SplitStream<WsStream>,
    pending: PendingCommands,
    subscriptions: Subscriptions,
    closed: Arc<AtomicBool>,
    outgoing: mpsc::UnboundedSender<Message>,
) {
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                dispatch_frame(&text, &pending, &subscriptions);
            }
            Ok(Message::Ping(payload)) => {
                let _ = outgoing.send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                debug!("Endpoint closed the connection");
                break;
            }
            Ok(_) => {
                // Binary, Pong, and raw frames carry nothing for us
            }
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
        }
    }

    closed.store(true, Ordering::SeqCst);

    let stranded: Vec<u64> = pending.iter().map(|entry| *entry.key()).collect();
    for id in stranded {
        if let Some((_, tx)) = pending.remove(&id) {
            let _ = tx.send(Err(CdpClientError::ConnectionClosed));
        }
    }

    // Dropping the senders ends every subscription stream
    subscriptions.clear();
    debug!("Reader stopped");
}

/// Route one text frame to its pending command or subscriber
fn dispatch_frame(text: &str, pending: &PendingCommands, subscriptions: &Subscriptions) {
    match parse_cdp_message(text) {
        Ok(CdpMessage::Response(response)) => match pending.remove(&response.id) {
            Some((_, tx)) => {
                let result = match response.error {
                    Some(error) => Err(CdpClientError::Command(error)),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };
                let _ = tx.send(result);
            }
            None => {
                debug!("Response for unknown request id {}", response.id);
            }
        },
        Ok(CdpMessage::Event(event)) => match subscriptions.get(&event.method) {
            Some(subscriber) => {
                if subscriber.send(event.params).is_err() {
                    debug!("Subscriber for {} is gone", event.method);
                }
            }
            None => {
                debug!("Unhandled event: {}", event.method);
            }
        },
        Ok(CdpMessage::Request(request)) => {
            debug!("Ignoring endpoint-initiated request: {}", request.method);
        }
        Err(e) => {
            warn!("Failed to parse message: {}", e);
        }
    }
}

//! Integration tests for the CDP client against an in-process endpoint

use cdp_client::{CdpClient, CdpClientError, ClientConfig};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Frames the mock endpoint sends in reaction to one request.
/// A `Value::Null` entry makes the endpoint drop the connection instead.
type Script = Box<dyn Fn(u64, &str, Option<Value>) -> Vec<Value> + Send>;

/// Start a WebSocket endpoint that answers requests via `script` and
/// forwards anything injected through the returned sender as-is.
async fn start_mock_endpoint(
    script: Script,
) -> (String, mpsc::UnboundedSender<Value>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("ws://127.0.0.1:{}", port);
    let (inject_tx, mut inject_rx) = mpsc::unbounded_channel::<Value>();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws_stream = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                frame = read.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => continue,
                        Some(Err(_)) => break,
                    };
                    let request: Value = serde_json::from_str(&text).unwrap();
                    let id = request["id"].as_u64().unwrap();
                    let method = request["method"].as_str().unwrap().to_string();
                    let params = request.get("params").cloned();
                    for reply in script(id, &method, params) {
                        if reply.is_null() {
                            return;
                        }
                        write.send(Message::Text(reply.to_string())).await.unwrap();
                    }
                }
                injected = inject_rx.recv() => {
                    match injected {
                        Some(frame) => {
                            write.send(Message::Text(frame.to_string())).await.unwrap();
                        }
                        None => break,
                    }
                }
            }
        }
    });

    (url, inject_tx, handle)
}

fn answer_everything() -> Script {
    Box::new(|id, _method, _params| vec![json!({"id": id, "result": {}})])
}

#[tokio::test]
async fn test_issue_command_resolves_result() {
    let (url, _inject, server) = start_mock_endpoint(Box::new(|id, method, _| {
        assert_eq!(method, "Tracing.getCategories");
        vec![json!({"id": id, "result": {"categories": ["blink", "v8"]}})]
    }))
    .await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    let result = client
        .issue_command("Tracing.getCategories", None)
        .await
        .unwrap();

    assert_eq!(result, json!({"categories": ["blink", "v8"]}));

    client.close();
    server.abort();
}

#[tokio::test]
async fn test_commands_carry_params_and_sequential_ids() {
    let (url, _inject, server) = start_mock_endpoint(Box::new(|id, method, params| {
        if method == "Tracing.start" {
            assert_eq!(params.unwrap()["streamFormat"], "json");
        }
        vec![json!({"id": id, "result": {"echo": id}})]
    }))
    .await;

    let client = CdpClient::connect_url(&url).await.unwrap();

    let first = client
        .issue_command("Tracing.start", Some(json!({"streamFormat": "json"})))
        .await
        .unwrap();
    let second = client.issue_command("Tracing.end", None).await.unwrap();

    assert_eq!(first["echo"], 1);
    assert_eq!(second["echo"], 2);

    client.close();
    server.abort();
}

#[tokio::test]
async fn test_command_rejection_surfaces_error_payload() {
    let (url, _inject, server) = start_mock_endpoint(Box::new(|id, _, _| {
        vec![json!({
            "id": id,
            "error": {"code": -32000, "message": "Tracing is already started"}
        })]
    }))
    .await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    let result = client.issue_command("Tracing.start", None).await;

    match result {
        Err(CdpClientError::Command(error)) => {
            assert_eq!(error.code, -32000);
            assert_eq!(error.message, "Tracing is already started");
        }
        other => panic!("Expected command rejection, got {:?}", other),
    }

    client.close();
    server.abort();
}

#[tokio::test]
async fn test_subscribed_events_arrive_in_order() {
    let (url, inject, server) = start_mock_endpoint(answer_everything()).await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    let mut events = client.subscribe("Tracing.dataCollected").unwrap();

    for n in 0..3 {
        inject
            .send(json!({"method": "Tracing.dataCollected", "params": {"value": [n]}}))
            .unwrap();
    }

    for n in 0..3 {
        let params = events.recv().await.unwrap();
        assert_eq!(params["value"][0], n);
    }

    client.close();
    server.abort();
}

#[tokio::test]
async fn test_unsubscribed_events_are_dropped() {
    let (url, inject, server) = start_mock_endpoint(answer_everything()).await;

    let client = CdpClient::connect_url(&url).await.unwrap();

    // Nothing subscribes to this; the client must keep working
    inject
        .send(json!({"method": "Page.loadEventFired", "params": {}}))
        .unwrap();

    let result = client.issue_command("Tracing.end", None).await;
    assert!(result.is_ok());

    client.close();
    server.abort();
}

#[tokio::test]
async fn test_pending_command_fails_when_endpoint_drops() {
    // Null reply makes the endpoint drop the socket without answering
    let (url, _inject, server) = start_mock_endpoint(Box::new(|_, _, _| vec![Value::Null])).await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    let result = client.issue_command("Tracing.end", None).await;

    assert!(matches!(result, Err(CdpClientError::ConnectionClosed)));

    server.abort();
}

#[tokio::test]
async fn test_event_streams_end_when_endpoint_drops() {
    let (url, _inject, server) = start_mock_endpoint(Box::new(|_, _, _| vec![Value::Null])).await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    let mut events = client.subscribe("Tracing.dataCollected").unwrap();

    // Trigger the drop, then the stream must end rather than hang
    let _ = client.issue_command("Tracing.end", None).await;
    assert!(events.recv().await.is_none());

    server.abort();
}

#[tokio::test]
async fn test_close_is_idempotent_and_rejects_further_use() {
    let (url, _inject, server) = start_mock_endpoint(answer_everything()).await;

    let client = CdpClient::connect_url(&url).await.unwrap();
    client.close();
    client.close();

    assert!(client.is_closed());
    assert!(matches!(
        client.issue_command("Tracing.end", None).await,
        Err(CdpClientError::ConnectionClosed)
    ));
    assert!(matches!(
        client.subscribe("Tracing.dataCollected"),
        Err(CdpClientError::ConnectionClosed)
    ));

    server.abort();
}

// --- Discovery over the HTTP metadata surface ---

/// Minimal HTTP responder: serves fixed JSON bodies for /json/version and
/// /json/list, 404 for anything else.
async fn start_metadata_server(
    version_body: Option<String>,
    list_body: Option<String>,
) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => break,
            };
            let version_body = version_body.clone();
            let list_body = list_body.clone();

            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let body = match path.as_str() {
                    "/json/version" => version_body,
                    "/json/list" => list_body,
                    _ => None,
                };
                let response = match body {
                    Some(body) => format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    ),
                    None => {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    }
                };
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });

    (port, handle)
}

#[tokio::test]
async fn test_discovery_prefers_browser_target() {
    let (port, server) = start_metadata_server(
        Some(r#"{"Browser": "Chrome/120.0", "webSocketDebuggerUrl": "ws://browser/target"}"#.into()),
        Some(r#"[{"webSocketDebuggerUrl": "ws://page/target"}]"#.into()),
    )
    .await;

    let config = ClientConfig::new("127.0.0.1", port);
    let url = cdp_client::discover_ws_url(&config).await.unwrap();
    assert_eq!(url, "ws://browser/target");

    server.abort();
}

#[tokio::test]
async fn test_discovery_falls_back_to_target_list() {
    let (port, server) = start_metadata_server(
        None,
        Some(r#"[{"type": "iframe"}, {"webSocketDebuggerUrl": "ws://page/target"}]"#.into()),
    )
    .await;

    let config = ClientConfig::new("127.0.0.1", port);
    let url = cdp_client::discover_ws_url(&config).await.unwrap();
    assert_eq!(url, "ws://page/target");

    server.abort();
}

#[tokio::test]
async fn test_discovery_fails_without_usable_target() {
    let (port, server) = start_metadata_server(None, Some(r#"[{"type": "iframe"}]"#.into())).await;

    let config = ClientConfig::new("127.0.0.1", port);
    let result = cdp_client::discover_ws_url(&config).await;
    assert!(matches!(result, Err(CdpClientError::Discovery(_))));

    server.abort();
}

#[tokio::test]
async fn test_connect_discovers_and_speaks() {
    let (ws_url, _inject, ws_server) = start_mock_endpoint(answer_everything()).await;
    let (port, http_server) = start_metadata_server(
        Some(format!(r#"{{"webSocketDebuggerUrl": "{}"}}"#, ws_url)),
        None,
    )
    .await;

    let config = ClientConfig::new("127.0.0.1", port);
    let client = CdpClient::connect(&config).await.unwrap();
    let result = client.issue_command("Tracing.end", None).await;
    assert!(result.is_ok());

    client.close();
    ws_server.abort();
    http_server.abort();
}

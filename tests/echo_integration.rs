//! End-to-end tests for the echo service.
//!
//! Each test binds the real router on an ephemeral port and drives it with
//! a WebSocket client; the plain HTTP routes are exercised with in-process
//! requests. Counter assertions poll until in-flight lifecycle updates
//! settle, since the counters are only eventually consistent with
//! connection events.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use ws_echo_service::config::Settings;
use ws_echo_service::counters::CounterSnapshot;
use ws_echo_service::server::{create_app, AppState};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

async fn spawn_server() -> (SocketAddr, AppState) {
    let state = AppState::new(test_settings());
    let app = create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    ws
}

/// Poll the counters until `predicate` holds or a bounded wait lapses.
async fn wait_for_counters<F>(state: &AppState, predicate: F)
where
    F: Fn(CounterSnapshot) -> bool,
{
    for _ in 0..100 {
        if predicate(state.counters.snapshot()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("counters did not settle: {:?}", state.counters.snapshot());
}

async fn expect_text(ws: &mut WsClient, expected: &str) {
    match ws.next().await {
        Some(Ok(Message::Text(text))) => assert_eq!(text.as_str(), expected),
        other => panic!("expected text {:?}, got {:?}", expected, other),
    }
}

// =============================================================================
// Echo contract
// =============================================================================

#[tokio::test]
async fn test_ping_scenario_echo_and_counters() {
    let (addr, state) = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::text("ping")).await.unwrap();
    expect_text(&mut ws, "ping").await;

    let payload = vec![0xDE, 0xAD, 0xBE, 0xEF];
    ws.send(Message::binary(payload.clone())).await.unwrap();
    match ws.next().await {
        Some(Ok(Message::Binary(bytes))) => assert_eq!(bytes.as_ref(), payload.as_slice()),
        other => panic!("expected binary echo, got {:?}", other),
    }

    ws.close(None).await.unwrap();

    wait_for_counters(&state, |c| c.accepted == 1 && c.closed == 1 && c.active == 0).await;
}

#[tokio::test]
async fn test_empty_payloads_round_trip() {
    let (addr, _state) = spawn_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::text("")).await.unwrap();
    expect_text(&mut ws, "").await;

    ws.send(Message::binary(Vec::new())).await.unwrap();
    match ws.next().await {
        Some(Ok(Message::Binary(bytes))) => assert!(bytes.is_empty()),
        other => panic!("expected empty binary echo, got {:?}", other),
    }

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn test_back_to_back_messages_echoed_in_order() {
    let (addr, _state) = spawn_server().await;
    let mut ws = connect(addr).await;

    for i in 0..10 {
        ws.send(Message::text(format!("msg-{}", i))).await.unwrap();
    }
    for i in 0..10 {
        expect_text(&mut ws, &format!("msg-{}", i)).await;
    }

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_receive_only_their_own_echoes() {
    let (addr, state) = spawn_server().await;

    let mut clients = Vec::new();
    for conn in 0..5 {
        clients.push(tokio::spawn(async move {
            let mut ws = connect(addr).await;
            for i in 0..5 {
                ws.send(Message::text(format!("conn-{}-msg-{}", conn, i)))
                    .await
                    .unwrap();
            }
            for i in 0..5 {
                expect_text(&mut ws, &format!("conn-{}-msg-{}", conn, i)).await;
            }
            ws.close(None).await.unwrap();
        }));
    }
    for client in clients {
        client.await.unwrap();
    }

    wait_for_counters(&state, |c| c.accepted == 5 && c.closed == 5 && c.active == 0).await;
}

// =============================================================================
// Connection lifecycle
// =============================================================================

#[tokio::test]
async fn test_clean_closes_settle_counters() {
    let (addr, state) = spawn_server().await;

    let mut connections = Vec::new();
    for _ in 0..3 {
        connections.push(connect(addr).await);
    }
    wait_for_counters(&state, |c| c.accepted == 3 && c.active == 3).await;

    for mut ws in connections {
        ws.close(None).await.unwrap();
    }
    wait_for_counters(&state, |c| c.accepted == 3 && c.closed == 3 && c.active == 0).await;
}

#[tokio::test]
async fn test_abrupt_disconnect_still_closes_exactly_once() {
    let (addr, state) = spawn_server().await;

    let mut ws = connect(addr).await;
    ws.send(Message::text("before-drop")).await.unwrap();
    expect_text(&mut ws, "before-drop").await;

    // Tear the TCP stream down without a close frame
    drop(ws);

    wait_for_counters(&state, |c| c.accepted == 1 && c.closed == 1 && c.active == 0).await;
}

#[tokio::test]
async fn test_rejected_upgrade_is_never_counted() {
    let state = AppState::new(test_settings());
    let app = create_app(state.clone());

    let response = app
        .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let snapshot = state.counters.snapshot();
    assert_eq!(snapshot.accepted, 0);
    assert_eq!(snapshot.closed, 0);
}

// =============================================================================
// HTTP collaborators
// =============================================================================

#[tokio::test]
async fn test_health_returns_ok_regardless_of_connections() {
    let (addr, state) = spawn_server().await;
    let _ws = connect(addr).await;
    wait_for_counters(&state, |c| c.active == 1).await;

    let response = create_app(state.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_stats_reports_counter_snapshot() {
    let (addr, state) = spawn_server().await;

    let mut ws = connect(addr).await;
    ws.close(None).await.unwrap();
    wait_for_counters(&state, |c| c.accepted == 1 && c.closed == 1).await;

    let response = create_app(state.clone())
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["connections"]["accepted"], 1);
    assert_eq!(stats["connections"]["closed"], 1);
    assert_eq!(stats["connections"]["active"], 0);
}

#[tokio::test]
async fn test_metrics_exposition_contains_connection_counters() {
    let state = AppState::new(test_settings());

    let response = create_app(state)
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let exposition = String::from_utf8(body.to_vec()).unwrap();
    assert!(exposition.contains("wsecho_connections_accepted_total"));
    assert!(exposition.contains("wsecho_connections_closed_total"));
    assert!(exposition.contains("wsecho_connections_active"));
}

use std::time::Instant;

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::metrics::{CONNECTIONS_ACCEPTED_TOTAL, CONNECTIONS_CLOSED_TOTAL, CONNECTION_DURATION};
use crate::server::AppState;

use super::echo::EchoConnectionHandler;

/// WebSocket upgrade handler
///
/// Requests that cannot be upgraded are rejected by the extractor with an
/// HTTP error status and never reach the connection handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive an established WebSocket connection through its lifecycle.
///
/// Frames are read and echoed sequentially, so per-connection ordering is
/// preserved; nothing is shared with other connections except the counter
/// sink. The task exits through a single path, so every `on_open` is
/// matched by exactly one `on_close`.
#[tracing::instrument(
    name = "ws.connection",
    skip(socket, state),
    fields(connection_id = tracing::field::Empty)
)]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    tracing::Span::current().record("connection_id", tracing::field::display(connection_id));
    let connection_start = Instant::now();

    let handler = EchoConnectionHandler::new(state.counters.clone());
    let mut shutdown_rx = state.shutdown.subscribe();

    handler.on_open();
    CONNECTIONS_ACCEPTED_TOTAL.inc();
    tracing::info!("WebSocket connection established");

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            received = ws_receiver.next() => {
                match received {
                    Some(Ok(msg)) => {
                        if !handler.on_message(&mut ws_sender, msg).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        // Peer resets and protocol violations land here;
                        // they terminate only this connection.
                        tracing::warn!(error = %e, "WebSocket receive error");
                        break;
                    }
                    None => {
                        tracing::debug!("WebSocket stream ended");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                // Bounded close handshake; unflushed frames are dropped if
                // the peer cannot take the close within the grace period.
                let _ = tokio::time::timeout(state.grace.close_grace, ws_sender.close()).await;
                tracing::debug!("Connection closed by server shutdown");
                break;
            }
        }
    }

    handler.on_close();
    CONNECTIONS_CLOSED_TOTAL.inc();
    let duration = connection_start.elapsed().as_secs_f64();
    CONNECTION_DURATION.observe(duration);

    tracing::info!(duration_secs = duration, "WebSocket connection closed");
}

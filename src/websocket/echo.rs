//! Lifecycle contract for a single echo connection.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};

use crate::counters::CounterSink;
use crate::metrics::EchoMetrics;

/// Runs the message lifecycle of one WebSocket connection.
///
/// The handler owns no I/O of its own. The transport invokes `on_open` once
/// after a successful upgrade, `on_message` once per received frame in
/// arrival order, and `on_close` once when the connection terminates, and
/// the handler reports the lifecycle transitions to the injected counter
/// sink. Writes go through a generic [`Sink`] so tests can drive the
/// contract with a plain channel instead of a socket.
pub struct EchoConnectionHandler {
    counters: Arc<dyn CounterSink>,
}

impl EchoConnectionHandler {
    pub fn new(counters: Arc<dyn CounterSink>) -> Self {
        Self { counters }
    }

    /// Called exactly once per connection, immediately after the upgrade.
    pub fn on_open(&self) {
        self.counters.connection_opened();
    }

    /// Echo a received frame back into `sender`.
    ///
    /// Text and binary frames are written back with the same kind and
    /// identical payload bytes; zero-length payloads round-trip as empty
    /// frames. Returns `false` when the connection is done processing
    /// frames: after a close frame, or after a failed echo write (a dead
    /// outbound side terminates the connection immediately rather than
    /// waiting for the next read to fail).
    pub async fn on_message<S>(&self, sender: &mut S, msg: Message) -> bool
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        match msg {
            Message::Text(text) => {
                let ok = self.echo(sender, Message::Text(text)).await;
                if ok {
                    EchoMetrics::record_text();
                }
                ok
            }
            Message::Binary(payload) => {
                let ok = self.echo(sender, Message::Binary(payload)).await;
                if ok {
                    EchoMetrics::record_binary();
                }
                ok
            }
            // Control frames are not data: the transport answers pings
            // itself, so neither kind is echoed.
            Message::Ping(_) | Message::Pong(_) => true,
            Message::Close(_) => false,
        }
    }

    /// Called exactly once per connection, when the transport detects EOF,
    /// a close frame, or an I/O error. Never runs without a matching prior
    /// `on_open`.
    pub fn on_close(&self) {
        self.counters.connection_closed();
    }

    async fn echo<S>(&self, sender: &mut S, msg: Message) -> bool
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
    {
        if let Err(e) = sender.send(msg).await {
            tracing::warn!(error = %e, "Failed to write echo");
            return false;
        }
        true
    }
}

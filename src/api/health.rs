//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::counters::CounterSnapshot;
use crate::server::AppState;

/// GET /health - liveness probe
///
/// Always returns 200 with a fixed body, independent of connection state.
pub async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub version: String,
    pub uptime_seconds: u64,
    pub connections: CounterSnapshot,
}

/// GET /stats - JSON snapshot of the connection counters
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        connections: state.counters.snapshot(),
    })
}

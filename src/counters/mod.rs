//! Connection lifecycle counters shared across all connections.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Sink for connection lifecycle transitions.
///
/// Connection handlers report opens and closes through this trait rather
/// than touching process-wide state directly, so tests can observe the
/// bookkeeping with a fake sink.
pub trait CounterSink: Send + Sync {
    fn connection_opened(&self);
    fn connection_closed(&self);
}

/// Process-wide connection counters.
///
/// `accepted` and `closed` only ever increase; the active count is derived
/// as `accepted - closed`. A reader may lag in-flight transitions, but the
/// equation holds once updates settle.
pub struct ConnectionCounters {
    accepted: AtomicU64,
    closed: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterSnapshot {
    pub accepted: u64,
    pub closed: u64,
    pub active: u64,
}

impl ConnectionCounters {
    pub fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            closed: AtomicU64::new(0),
        }
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }

    pub fn active(&self) -> u64 {
        self.snapshot().active
    }

    /// Get a consistent-enough snapshot for reporting.
    ///
    /// `closed` is loaded first, acquire-paired with the release increment
    /// in `connection_closed`: every close follows its own accept, so a
    /// snapshot can never observe closed > accepted.
    pub fn snapshot(&self) -> CounterSnapshot {
        let closed = self.closed.load(Ordering::Acquire);
        let accepted = self.accepted.load(Ordering::Relaxed);
        CounterSnapshot {
            accepted,
            closed,
            active: accepted.saturating_sub(closed),
        }
    }
}

impl CounterSink for ConnectionCounters {
    fn connection_opened(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn connection_closed(&self) {
        self.closed.fetch_add(1, Ordering::Release);
    }
}

impl Default for ConnectionCounters {
    fn default() -> Self {
        Self::new()
    }
}

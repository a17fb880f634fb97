//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod routes;

pub use health::{health, stats, StatsResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;

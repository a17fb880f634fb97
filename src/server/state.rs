use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Settings;
use crate::counters::ConnectionCounters;
use crate::shutdown::GraceConfig;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub counters: Arc<ConnectionCounters>,
    pub shutdown: broadcast::Sender<()>,
    pub grace: GraceConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let (shutdown, _) = broadcast::channel(1);

        Self {
            settings: Arc::new(settings),
            counters: Arc::new(ConnectionCounters::new()),
            shutdown,
            grace: GraceConfig::default(),
            start_time: Instant::now(),
        }
    }
}

//! Command-line configuration for the echo service.
//!
//! The listen address and port are the only externally visible configuration
//! surface; everything else is fixed. `RUST_LOG` tunes log verbosity only.

use clap::Parser;

/// Command-line arguments for the echo service
#[derive(Parser, Debug, Clone)]
#[command(name = "ws-echo-service")]
#[command(about = "WebSocket echo server with connection metrics", long_about = None)]
pub struct Settings {
    /// Network interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port number for the service
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

impl Settings {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ws_echo_service::config::Settings;
use ws_echo_service::server::{create_app, AppState};
use ws_echo_service::shutdown;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command-line configuration
    let settings = Settings::parse();
    tracing::info!(host = %settings.host, port = settings.port, "Configuration loaded");

    // Create application state
    let state = AppState::new(settings);

    // Create Axum app
    let app = create_app(state.clone());

    // Start server
    let addr = state.settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal(state.shutdown.clone()))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Music coordinator service.
//!
//! Accepts play requests over MQTT and HTTP, resolves them against the
//! SQLite store, and publishes play commands for the home automation hub.

mod config;
mod discovery;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use database::Database;
use dispatcher::{Dispatcher, PlayListener};
use mqtt_bridge::{MqttBridge, PLAY_TOPIC};
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::discovery::HomeAssistantClient;
use crate::state::{AppState, SharedPublisher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, broker = %config.bridge.address(), "Starting music coordinator");

    // Store first; nothing else is useful without it
    let db = Database::open(&config.database_url).await?;

    // Broker connection and the play topic subscription
    let bridge = MqttBridge::connect(config.bridge.clone()).await?;
    let subscription = bridge.subscribe(PLAY_TOPIC).await?;

    let publisher: SharedPublisher = Arc::new(bridge.clone());
    let dispatcher = Arc::new(Dispatcher::new(db.clone(), publisher));

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let listener = PlayListener::new(subscription, Arc::clone(&dispatcher));
    let listener_task = tokio::spawn(listener.run_with_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    }));

    let home_assistant = HomeAssistantClient::new(&config.ha_url, &config.ha_token)?;
    let state = AppState::new(db.clone(), dispatcher, home_assistant);

    let app = routes::router()
        .fallback_service(ServeDir::new(&config.ui_dir))
        .layer(routes::cors())
        .with_state(state);

    info!(addr = %config.addr, "HTTP server listening");
    let tcp = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    match listener_task.await {
        Ok(stats) => info!(
            dispatched = stats.dispatched,
            skipped = stats.skipped,
            failed = stats.failed,
            "Play listener stopped"
        ),
        Err(e) => error!("Play listener task failed: {}", e),
    }

    bridge.disconnect(Duration::from_millis(250)).await;
    db.close().await;

    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

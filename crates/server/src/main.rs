mod bootstrap;
mod chat;
mod health;
mod inventory;
mod llm;
mod response;
mod voice;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use frontdesk_core::config::{AppConfig, LoadOptions};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bootstrap::AppState;

fn init_logging(config: &AppConfig) {
    use frontdesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let sweeper = spawn_session_sweeper(
        app.state.clone(),
        Duration::from_secs(app.config.store.sweep_interval_secs.max(1)),
    );

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        bind_address = %address,
        hotel = %app.config.hotel.name,
        "frontdesk-server listening"
    );

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let server = axum::serve(listener, bootstrap::router(app.state))
        .with_graceful_shutdown(async move { signal.notified().await });
    let mut serving = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut serving => {
            sweeper.abort();
            joined??;
            return Ok(());
        }
        () = wait_for_shutdown() => {}
    }

    info!(event_name = "system.server.stopping", "frontdesk-server draining connections");
    shutdown.notify_one();
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, &mut serving).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!(
                event_name = "system.server.drain_timeout",
                grace_secs = grace.as_secs(),
                "connections still open after grace period"
            );
            serving.abort();
        }
    }
    sweeper.abort();
    info!(event_name = "system.server.stopped", "frontdesk-server stopped");

    Ok(())
}

/// Evicts idle chat sessions on a fixed interval.
fn spawn_session_sweeper(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match state.runtime.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(
                    event_name = "system.sessions.swept",
                    removed,
                    "expired chat sessions removed"
                ),
                Err(error) => warn!(
                    event_name = "system.sessions.sweep_failed",
                    error = %error,
                    "session sweep failed"
                ),
            }
        }
    })
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(
            event_name = "system.server.signal_failed",
            error = %error,
            "could not listen for ctrl-c, shutting down"
        );
    }
}

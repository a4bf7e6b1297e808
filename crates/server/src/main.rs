mod bootstrap;
mod chat;
mod health;

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use ella_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use ella_core::config::LogFormat::*;
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

    let router =
        chat::router(app.runtime.clone()).merge(health::router(app.db_pool.clone()));
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.started",
        bind_address = %address,
        llm_enabled = app.config.llm.enabled,
        "ella-server started"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::signal::ctrl_c().await?;
    info!(event_name = "system.server.stopping", "shutdown signal received");
    let _ = shutdown_tx.send(());

    // In-flight turns get the configured grace period before we stop waiting.
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!(
                event_name = "system.server.drain_timeout",
                grace_secs = app.config.server.graceful_shutdown_secs,
                "graceful drain exceeded the grace period"
            );
        }
    }

    Ok(())
}

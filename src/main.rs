mod api;
mod command;
mod config;
mod serial;

use anyhow::{Context, Result};
use command::CommandGateway;
use config::BridgeConfig;
use serial::SerialChannel;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = BridgeConfig::from_env()?;

    info!("LED bridge starting");
    info!("  device: {} @ {} baud", config.device_path, config.baud_rate);
    info!("  listen: {}", config.listen_addr);

    // The port is acquired before the listener: without the device this
    // process cannot serve its purpose, so an open failure is fatal.
    let channel = match SerialChannel::open(
        &config.device_path,
        config.baud_rate,
        config.io_timeout,
    ) {
        Ok(channel) => channel,
        Err(e) => {
            error!("refusing to start: {e}");
            return Err(e.into());
        }
    };
    info!("Serial connection open");

    let gateway = CommandGateway::new(channel.clone());
    let app = api::router(gateway);

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Release the device handle on every exit path past this point
    channel.shutdown().await;
    info!("Serial connection closed, exiting");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

//! packet-sd: Prometheus file_sd discovery for Packet.
//!
//! Single binary that wires the discovery pipeline together:
//! - Packet API client (credentials checked at startup)
//! - Discovery loop
//! - file_sd adapter
//! - `/metrics` endpoint
//!
//! # Usage
//!
//! ```text
//! PACKET_AUTH_TOKEN=... packet-sd --output.file /etc/prometheus/packet.json
//! ```

mod cli;
mod server;

use std::future::Future;
use std::sync::Arc;

use clap::Parser;
use packet_sd_adapter::FileSdAdapter;
use packet_sd_client::{ApiError, ApiLogger, InventoryApi, PacketClient, TracingLogger};
use packet_sd_core::SdConfig;
use packet_sd_discovery::Discoverer;
use packet_sd_metrics::SdMetrics;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogFormat};

const DEFAULT_LOG_FILTER: &str = "info,packet_sd=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.into_config()?;
    run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(config: SdConfig) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "packet-sd starting");

    let logger: Arc<dyn ApiLogger> = Arc::new(TracingLogger);
    let client = Arc::new(PacketClient::new(
        &config.api_url,
        &config.auth_token,
        logger.clone(),
    ));

    // Nothing starts until the token is known to work.
    if let Err(e) = client.list_projects().await {
        logger.fatal(&credential_error(&e));
    }
    info!(api = %config.api_url, "Packet credentials verified");

    let shutdown = shutdown_signal()?;
    let addr = server::bind_address(&config.listen_address);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // ── Pipeline ───────────────────────────────────────────────

    let metrics = SdMetrics::new();
    let discoverer = Discoverer::from_config(client, metrics.clone(), &config);
    let adapter = FileSdAdapter::new(&config.output_file);

    let (tx, rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let adapter_handle = tokio::spawn(adapter.run(rx));
    let discoverer_handle = tokio::spawn(discoverer.run(tx, shutdown_rx));

    // ── Metrics endpoint ───────────────────────────────────────

    debug!(%addr, "listening for connections");
    axum::serve(listener, server::metrics_router(metrics))
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    // The adapter stops once the discoverer drops its sender.
    let _ = discoverer_handle.await;
    let _ = adapter_handle.await;

    info!("packet-sd stopped");
    Ok(())
}

/// Startup message for a failed credential check.
fn credential_error(err: &ApiError) -> String {
    if err.is_unauthorized() {
        format!("Packet API rejected the auth token: {err}")
    } else {
        format!("failed to check Packet credentials: {err}")
    }
}

/// Resolves on the first SIGINT or SIGTERM.
///
/// Handlers are installed before returning so a signal that arrives during
/// startup is not lost.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!(signal = "SIGTERM", "shutdown signal received"),
            _ = sigint.recv() => info!(signal = "SIGINT", "shutdown signal received"),
        }
    })
}

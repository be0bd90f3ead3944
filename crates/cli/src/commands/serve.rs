//! `serve` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::MessageBroker;
use dispatcher::{DispatcherBuilder, DispatcherConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::load_effective_config;
use crate::cli::ServeArgs;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let config = load_effective_config(&args.config)?;

    info!(
        listen = %config.server.listen_addr(),
        broker = ?config.broker.kind,
        endpoints = ?config.broker.endpoints,
        publish_timeout_ms = config.dispatch.publish_timeout_ms,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let dispatcher = DispatcherBuilder::new(DispatcherConfig::from(&config))
        .build()
        .context("Failed to create broker")?;
    let dispatcher = Arc::new(dispatcher);

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(broker = %dispatcher.broker().name(), "Starting event dispatcher...");

    http_api::serve(
        listener,
        http_api::router(Arc::clone(&dispatcher), config.server.max_body_bytes),
        shutdown_signal(),
    )
    .await
    .context("HTTP server failed")?;

    let metrics = dispatcher.metrics();
    info!(
        batches = metrics.batch_count,
        succeeded = metrics.succeeded_count,
        invalid = metrics.invalid_count,
        failed = metrics.failed_count,
        "Dispatch totals"
    );

    dispatcher
        .shutdown()
        .await
        .context("Failed to close broker")?;

    info!("Event dispatcher finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, draining in-flight requests...");
}

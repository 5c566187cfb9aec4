use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{ApiState, create_router};
use crate::core::config::AppConfig;

/// Binds `bind` (or the configured address) and serves until Ctrl-C.
pub async fn run(config: &AppConfig, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&config.server.bind);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve(listener, config, shutdown_signal()).await
}

/// Serves the API on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    config: &AppConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let state = Arc::new(ApiState {
        aggregator: crate::build_aggregator(config)?,
        default_country: config.default_country.clone(),
    });
    let router = create_router(state);

    info!(
        addr = %listener.local_addr()?,
        indicators = config.indicators.len(),
        "Indicator service listening"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Indicator service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

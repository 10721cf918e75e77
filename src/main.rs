//! alphasense-oracle entry point.
//!
//! Boots the chain gateway, the event listener, the orchestrator and
//! the health endpoint, then runs until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use alphasense_oracle::api;
use alphasense_oracle::app_state::AppState;
use alphasense_oracle::chain::{ChainGateway, ChainSubmitter};
use alphasense_oracle::config::OracleConfig;
use alphasense_oracle::providers::{
    ContentStore, HttpContentStore, HttpMarketDataProvider, MarketDataProvider, ReportGenerator,
    TemplateReportGenerator,
};
use alphasense_oracle::service::{Orchestrator, OrchestratorOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration; missing contract address or signing key is fatal.
    let config = OracleConfig::from_env().context("configuration")?;
    tracing::info!(addr = %config.listen_addr, "starting alphasense-oracle");

    // Collaborators
    let market_data: Arc<dyn MarketDataProvider> = Arc::new(
        HttpMarketDataProvider::new(
            config.market_data_url.clone(),
            config.market_data_api_key.clone(),
        )
        .context("market data client")?,
    );
    let generator: Arc<dyn ReportGenerator> = Arc::new(TemplateReportGenerator::new());
    let store: Arc<dyn ContentStore> =
        Arc::new(HttpContentStore::new(config.storage_url.clone()).context("storage client")?);

    let gateway = Arc::new(
        ChainGateway::connect(&config)
            .await
            .context("chain gateway")?,
    );

    // Orchestrator + event plumbing
    let orchestrator = Arc::new(Orchestrator::new(
        market_data,
        generator,
        store,
        Arc::clone(&gateway) as Arc<dyn ChainSubmitter>,
        OrchestratorOptions::from_config(&config),
    ));

    let (request_tx, request_rx) = mpsc::channel(config.request_channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener_gateway = Arc::clone(&gateway);
    let listener_task = tokio::spawn(async move {
        if let Err(e) = listener_gateway.stream_requests(request_tx).await {
            tracing::error!(error = %e, "event listener terminated");
        }
    });

    let orchestrator_task = tokio::spawn(orchestrator.run(request_rx, shutdown_rx));

    // Health endpoint
    let app = axum::Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("bind health endpoint")?;
    tracing::info!(addr = %config.listen_addr, "health endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received; shutting down");
        })
        .await
        .context("http server")?;

    // Stop intake and let in-flight requests drain within the grace period.
    let _ = shutdown_tx.send(true);
    listener_task.abort();
    if let Err(e) = orchestrator_task.await {
        tracing::error!(error = %e, "orchestrator task failed during shutdown");
    }

    tracing::info!("shutdown complete");
    Ok(())
}

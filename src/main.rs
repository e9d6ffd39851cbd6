use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use review_rag::core::config::ConfigService;
use review_rag::core::logging;
use review_rag::server;
use review_rag::state::error::InitializationError;
use review_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigService::load().map_err(InitializationError::from)?;
    logging::init(&config.settings.logging);
    tracing::debug!("Loaded configuration: {:?}", config);

    let state = AppState::initialize(&config).await?;
    tracing::info!(
        "Serving collection {} ({} documents ingested at startup)",
        state.collection.name,
        state.collection.upserted
    );

    let bind_addr = config.settings.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

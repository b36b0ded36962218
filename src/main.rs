//! Registration server: REST at `/usuarios`, GraphQL at `/graphql`.

use anyhow::Context;
use registro::api::rest::{AppState, create_router};
use registro::application::services::BackendRegistry;
use registro::config::Settings;
use registro::telemetry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    telemetry::init(&settings.logging).context("failed to initialize logging")?;

    let registry = BackendRegistry::connect(&settings.storage).await;
    let backends: Vec<String> = registry.iter().map(|(kind, _)| kind.to_string()).collect();
    info!(
        default_backend = %registry.default_backend(),
        backends = ?backends,
        "storage ready"
    );

    let router = create_router(AppState::new(registry));
    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

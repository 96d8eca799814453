//! HTTP server implementation

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::KvClient;
use crate::gateway::Gateway;
use super::handlers::{store_handler, retrieve_handler, remove_handler, health_handler};

/// Build the application router
pub fn router<C: KvClient>(gateway: Arc<Gateway<C>>) -> Router {
    Router::new()
        .route("/kv", post(store_handler::<C>))
        .route("/kv/", get(retrieve_handler::<C>).delete(remove_handler::<C>))
        .route("/kv/:key", get(retrieve_handler::<C>).delete(remove_handler::<C>))
        .route("/health", get(health_handler::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Run the gateway HTTP server on `addr` until `shutdown` is cancelled
pub async fn run<C: KvClient>(
    addr: &str,
    gateway: Arc<Gateway<C>>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway listening on http://{}", listener.local_addr()?);

    serve(listener, gateway, shutdown).await
}

/// Serve the gateway from an already bound listener
pub async fn serve<C: KvClient>(
    listener: TcpListener,
    gateway: Arc<Gateway<C>>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

//! Storage server module
//!
//! Accepts TCP connections from gateways and hands each one to its own
//! task. All connections share the same dispatcher and store.

mod connection;

use crate::dispatch::Dispatcher;
use crate::store::MemoryStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, error};

pub use connection::Connection;

/// Run the storage server
///
/// Binds the given address and serves the store until `shutdown` is cancelled.
pub async fn run(
    addr: &str,
    store: Arc<MemoryStore>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("FerrumKV storage server listening on {}", listener.local_addr()?);

    serve(listener, Dispatcher::new(store), shutdown).await
}

/// Serve connections from an already bound listener
pub async fn serve(
    listener: TcpListener,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let (socket, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = shutdown.cancelled() => {
                info!("Storage server shutting down ({} keys held)", dispatcher.store().len());
                return Ok(());
            }
        };
        info!("New storage connection from {}", addr);

        let dispatcher = dispatcher.clone();
        let shutdown = shutdown.clone();

        // Spawn a new task to handle this connection
        tokio::spawn(async move {
            let mut connection = Connection::new(socket);

            if let Err(e) = connection.handle(dispatcher, shutdown).await {
                error!("Connection error from {}: {}", addr, e);
            }

            info!("Connection closed: {}", addr);
        });
    }
}

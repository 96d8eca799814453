use ferrumkv::{server, web, Config, Gateway, MemoryStore, RemoteClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, error};
use std::sync::Arc;

/// Which tiers this process runs
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Storage,
    Gateway,
    All,
}

fn parse_mode(arg: Option<&str>) -> Option<Mode> {
    match arg {
        None | Some("all") => Some(Mode::All),
        Some("storage") => Some(Mode::Storage),
        Some("gateway") => Some(Mode::Gateway),
        Some(_) => None,
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG, INFO by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .init();

    let arg = std::env::args().nth(1);
    let Some(mode) = parse_mode(arg.as_deref()) else {
        error!("Unknown mode {:?}, expected one of: storage, gateway, all", arg);
        std::process::exit(2);
    };

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("FerrumKV starting in {:?} mode", mode);

    let shutdown = CancellationToken::new();
    let mut tasks = tokio::task::JoinSet::new();

    if mode != Mode::Gateway {
        let store = Arc::new(MemoryStore::with_capacity(config.storage.initial_capacity));
        let addr = config.storage.listen_addr.clone();
        let shutdown = shutdown.clone();
        tasks.spawn(async move {
            if let Err(e) = server::run(&addr, store, shutdown).await {
                error!("Storage server error: {:#}", e);
            }
        });
    }

    if mode != Mode::Storage {
        let client = RemoteClient::new(
            config.gateway.storage_addr.clone(),
            config.gateway.request_timeout(),
        )
        .with_max_idle(config.gateway.max_idle_connections);
        info!("Gateway forwarding to storage service at {}", client.addr());

        let gateway = Arc::new(Gateway::new(client));
        let addr = config.gateway.listen_addr.clone();
        let shutdown = shutdown.clone();
        tasks.spawn(async move {
            if let Err(e) = web::run(&addr, gateway, shutdown).await {
                error!("Gateway error: {:#}", e);
            }
        });
    }

    // Stop everything on Ctrl-C or as soon as one server exits
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
        _ = tasks.join_next() => error!("A server stopped unexpectedly"),
    }
    shutdown.cancel();
    while tasks.join_next().await.is_some() {}
    info!("FerrumKV stopped");
}

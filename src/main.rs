//! # Places Proxy - Main Entry Point
//!
//! Startup sequence: configuration, logging, metrics, cache backend, the
//! `Metered(Cached(Direct))` client stack, then the HTTP server until SIGINT
//! or SIGTERM.

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use places_proxy::caching::stores::{CacheStore, InMemoryStore, RedisStore, RedisStoreConfig};
use places_proxy::caching::{CachedFetcher, KeyBuilder, ValueStore};
use places_proxy::core::config::{CacheBackend, CacheConfig, ProxyConfig};
use places_proxy::observability::{init_tracing, install_prometheus};
use places_proxy::places::service::{PlacesServiceRouter, PlacesServiceState};
use places_proxy::places::{CachedPlacesClient, DirectPlacesClient, MeteredPlacesClient, PlacesClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ProxyConfig::load().await.context("loading configuration")?;

    init_tracing(&config.observability).context("initializing logging")?;
    info!("Starting places proxy v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        install_prometheus(&config.observability).context("installing metrics exporter")?;
    }

    let store = ValueStore::new(build_backend(&config.cache).await?);
    let fetcher = CachedFetcher::new(store.clone(), config.cache.ttl);

    let direct = DirectPlacesClient::new(&config.upstream).context("building upstream client")?;
    let cached = CachedPlacesClient::new(direct, fetcher)
        .with_key_builder(KeyBuilder::new(config.cache.key_prefix.clone()));
    let client: Arc<dyn PlacesClient> = Arc::new(MeteredPlacesClient::new(cached));

    let state = PlacesServiceState::new(client)
        .with_request_timeout(config.server.request_timeout)
        .with_store(store);
    let app = PlacesServiceRouter::create_router(state);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Places proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Places proxy shutdown complete");
    Ok(())
}

/// Build the configured backend. An unreachable Redis stays the backend:
/// requests go straight upstream until it connects in the background.
async fn build_backend(config: &CacheConfig) -> anyhow::Result<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Redis => {
            let store = RedisStore::new(RedisStoreConfig::from(&config.redis))
                .context("configuring Redis cache")?;
            if let Err(e) = store.try_connect().await {
                warn!(error = %e, "Redis unavailable, serving uncached until it reconnects");
            }
            Ok(Arc::new(store))
        }
        CacheBackend::Memory => Ok(memory_backend(config)),
    }
}

fn memory_backend(config: &CacheConfig) -> Arc<dyn CacheStore> {
    let store = Arc::new(InMemoryStore::new());
    store.spawn_janitor(config.cleanup_interval);
    store
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

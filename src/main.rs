//! Arena Portal — Entry Point
//!
//! Builds the persistence gateway and serves its probes until SIGINT.
//!
//! Wiring sequence:
//! 1. Load `.env`, then config.toml (or defaults) + env overrides
//! 2. Init tracing (JSON structured logging)
//! 3. Pick the store once: remote when URL + key are set, else fallback
//! 4. Create PortalGateway bound to that store, counting into Prometheus
//! 5. Spawn health server (/live + /ready) and metrics server (/metrics)
//! 6. Wait for SIGINT → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use arena_portal::adapters::connect_store;
use arena_portal::adapters::metrics::{HealthServer, MetricsRegistry};
use arena_portal::config::{self, AppConfig};
use arena_portal::usecases::PortalGateway;

/// Env var naming the config file (default `config.toml`).
const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let _ = dotenvy::dotenv();
    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config_or_default(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.portal.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Arena Portal"
    );

    // ── 3. Bind the store (decided once) ────────────────────
    let (store, mode) = connect_store(&config.store)
        .await
        .context("Failed to connect document store")?;

    // ── 4. Gateway + metrics ────────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics")?);
    metrics.set_store_mode(mode);

    let gateway = Arc::new(
        PortalGateway::new(store, mode).with_recorder(metrics.clone()),
    );

    // ── 5. Spawn servers ────────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    let health = HealthServer::new(Arc::clone(&gateway), config.server.health_port)
        .with_metrics(Arc::clone(&metrics));
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    let metrics_handle = if config.server.metrics_enabled {
        let bind = config.server.metrics_bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        let registry = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            if let Err(e) = registry.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    info!(mode = %gateway.mode(), "Portal ready");

    // ── 6. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), health_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// JSON or plain log lines; `RUST_LOG` wins over `portal.log_level`.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.portal.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.portal.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

//! Prometheus Metrics Registry - Gateway Observability
//!
//! Registers and exposes Prometheus metrics for the portal gateway:
//! operation counts by outcome, the active store mode and store health.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::ports::store::StoreMode;
use crate::ports::telemetry::{OperationRecorder, Outcome};

/// Centralized Prometheus metrics for the portal.
///
/// All metrics follow the naming convention `arena_portal_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Gateway operations by name and outcome.
    pub operations: IntCounterVec,
    /// Active store mode (1 on the active label).
    pub store_mode: IntGaugeVec,
    /// Store health as last probed (1 = healthy).
    pub store_healthy: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let operations = IntCounterVec::new(
            Opts::new(
                "arena_portal_operations_total",
                "Gateway operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;

        let store_mode = IntGaugeVec::new(
            Opts::new(
                "arena_portal_store_mode",
                "Store backend selected at startup (1 = active)",
            ),
            &["mode"],
        )?;

        let store_healthy = IntGauge::new(
            "arena_portal_store_healthy",
            "Whether the store passed its last health probe (1=yes, 0=no)",
        )?;

        // Register all metrics
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(store_mode.clone()))?;
        registry.register(Box::new(store_healthy.clone()))?;

        Ok(Self {
            registry,
            operations,
            store_mode,
            store_healthy,
        })
    }

    /// Mark the store mode chosen at startup.
    pub fn set_store_mode(&self, mode: StoreMode) {
        self.store_mode.with_label_values(&[mode.as_str()]).set(1);
    }

    /// Render the registry in the Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move { metrics.render() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

impl OperationRecorder for MetricsRegistry {
    fn record(&self, operation: &'static str, outcome: Outcome) {
        self.operations
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
    }
}

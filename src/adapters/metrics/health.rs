//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7. Readiness probes
//! the gateway's store on every request.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use super::prometheus::MetricsRegistry;
use crate::usecases::gateway::PortalGateway;

/// State shared with the probe handlers.
#[derive(Clone)]
struct ProbeState {
    gateway: Arc<PortalGateway>,
    metrics: Option<Arc<MetricsRegistry>>,
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    state: ProbeState,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(gateway: Arc<PortalGateway>, port: u16) -> Self {
        Self {
            state: ProbeState {
                gateway,
                metrics: None,
            },
            port,
        }
    }

    /// Also publish each readiness result to the store health gauge.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.state.metrics = Some(metrics);
        self
    }

    /// Build the probe router.
    fn router(&self) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(self.state.clone())
    }

    /// Start the health check server in the background.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: returns 200 only if the store is healthy.
    async fn readiness(State(state): State<ProbeState>) -> impl IntoResponse {
        let healthy = state.gateway.is_healthy().await;
        if let Some(metrics) = &state.metrics {
            metrics.store_healthy.set(i64::from(healthy));
        }

        if healthy {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

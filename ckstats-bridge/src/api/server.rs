//! API server wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use super::v0;
use crate::api_client::types::{BridgeState, SensorState};
use crate::config::BridgeConfig;
use crate::coordinator::PoolCoordinator;
use crate::sensor::Sensor;

/// State shared by all API handlers.
#[derive(Clone)]
pub struct SharedState {
    pub coordinator: Arc<PoolCoordinator>,
    config: BridgeConfig,
    started: Instant,
}

impl SharedState {
    pub fn new(coordinator: Arc<PoolCoordinator>, config: BridgeConfig) -> Self {
        Self {
            coordinator,
            config,
            started: Instant::now(),
        }
    }

    pub fn bridge_state(&self) -> BridgeState {
        BridgeState {
            uptime_secs: self.started.elapsed().as_secs(),
            pool_host: self.config.pool_host.clone(),
            pool_port: self.config.pool_port,
            poll_interval_secs: self.config.poll_interval.as_secs(),
            pool_available: self.coordinator.pool_snapshot().is_some(),
            user_available: self.coordinator.user_snapshot().is_some(),
        }
    }

    pub fn sensor_states(&self) -> Vec<SensorState> {
        Sensor::all(&self.coordinator)
            .iter()
            .map(Sensor::state)
            .collect()
    }
}

/// Build the application router with OpenAPI docs mounted.
pub fn router(state: SharedState) -> Router {
    let (router, api) = OpenApiRouter::new()
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/docs").url("/api/v0/openapi.json", api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the cancellation token fires.
pub async fn serve(state: SharedState, addr: SocketAddr, cancel: CancellationToken) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API listener on {addr}"))?;
    info!("Bridge API listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    Ok(())
}

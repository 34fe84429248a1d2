//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the bridge reaches 1.0.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::api_client::types::{BridgeState, RefreshResponse, SensorState};
use crate::ckstats::Snapshot;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(get_bridge))
        .routes(routes!(get_sensors))
        .routes(routes!(get_sensor))
        .routes(routes!(get_pool))
        .routes(routes!(get_user))
        .routes(routes!(post_refresh))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Return the daemon status snapshot.
#[utoipa::path(
    get,
    path = "/bridge",
    tag = "bridge",
    responses(
        (status = OK, description = "Current bridge state", body = BridgeState),
    ),
)]
async fn get_bridge(State(state): State<SharedState>) -> Json<BridgeState> {
    Json(state.bridge_state())
}

/// Return every sensor's current state.
#[utoipa::path(
    get,
    path = "/sensors",
    tag = "sensors",
    responses(
        (status = OK, description = "All sensor states", body = Vec<SensorState>),
    ),
)]
async fn get_sensors(State(state): State<SharedState>) -> Json<Vec<SensorState>> {
    Json(state.sensor_states())
}

/// Return a single sensor by id, or 404 if not found.
#[utoipa::path(
    get,
    path = "/sensors/{id}",
    tag = "sensors",
    params(
        ("id" = String, Path, description = "Sensor id"),
    ),
    responses(
        (status = OK, description = "Sensor state", body = SensorState),
        (status = NOT_FOUND, description = "Sensor not found"),
    ),
)]
async fn get_sensor(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SensorState>, StatusCode> {
    state
        .sensor_states()
        .into_iter()
        .find(|sensor| sensor.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Return the raw pool snapshot, or 404 before the first refresh.
#[utoipa::path(
    get,
    path = "/pool",
    tag = "snapshots",
    responses(
        (status = OK, description = "Raw pool snapshot"),
        (status = NOT_FOUND, description = "No snapshot published yet"),
    ),
)]
async fn get_pool(State(state): State<SharedState>) -> Result<Json<Snapshot>, StatusCode> {
    state
        .coordinator
        .pool_snapshot()
        .map(|snapshot| Json((*snapshot).clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Return the raw primary-user snapshot, or 404 while no user is connected.
#[utoipa::path(
    get,
    path = "/user",
    tag = "snapshots",
    responses(
        (status = OK, description = "Raw primary-user snapshot"),
        (status = NOT_FOUND, description = "No user snapshot present"),
    ),
)]
async fn get_user(State(state): State<SharedState>) -> Result<Json<Snapshot>, StatusCode> {
    state
        .coordinator
        .user_snapshot()
        .map(|snapshot| Json((*snapshot).clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Trigger an immediate refresh cycle.
///
/// Reports "skipped" when a cycle is already in flight; the poll timer and
/// on-demand triggers never overlap.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "bridge",
    responses(
        (status = OK, description = "Refresh outcome", body = RefreshResponse),
    ),
)]
async fn post_refresh(State(state): State<SharedState>) -> Json<RefreshResponse> {
    let outcome = state.coordinator.refresh().await;
    Json(RefreshResponse {
        outcome: outcome.as_str().to_string(),
    })
}

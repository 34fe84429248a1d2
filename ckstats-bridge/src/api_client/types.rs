//! API data transfer objects.
//!
//! These types define the API contract shared between the bridge daemon
//! and its clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Daemon status snapshot.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct BridgeState {
    pub uptime_secs: u64,
    pub pool_host: String,
    pub pool_port: u16,
    pub poll_interval_secs: u64,
    /// True once a pool snapshot has been published.
    pub pool_available: bool,
    /// True while a primary-user snapshot is present.
    pub user_available: bool,
}

/// One sensor's current state.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct SensorState {
    /// Stable identifier (`ckpool_{scope}_{key}`).
    pub id: String,
    pub name: String,
    /// "pool" or "user".
    pub scope: String,
    pub available: bool,
    /// Extracted value; absent until the relevant snapshot exists.
    #[schema(value_type = Object)]
    pub value: Option<Value>,
    pub unit: Option<String>,
    pub state_class: Option<String>,
    pub icon: String,
    #[schema(value_type = Object)]
    pub attributes: Option<Map<String, Value>>,
}

/// Outcome of an on-demand refresh request.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// "updated", "skipped", or "failed".
    pub outcome: String,
}

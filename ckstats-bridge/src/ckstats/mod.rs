mod client;
mod snapshot;

pub use client::{
    HEALTH_ENDPOINT, POOL_CURRENT_ENDPOINT, StatsApi, StatsClient, StatsError, USERS_ENDPOINT,
};
pub use snapshot::{Snapshot, normalize};

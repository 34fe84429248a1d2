//! Read-only sensors over the coordinator's published snapshots.

mod descriptors;
mod format;

pub use descriptors::{POOL_SENSORS, SensorDescriptor, SensorScope, StateClass, USER_SENSORS};
pub use format::{format_difficulty, format_hashrate, format_timestamp};

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::api_client::types::SensorState;
use crate::ckstats::Snapshot;
use crate::coordinator::PoolCoordinator;

/// Identifier prefix shared by every sensor; stable across restarts.
const UNIQUE_ID_PREFIX: &str = "ckpool";

/// One addressable read-only value derived from the current snapshot.
pub struct Sensor {
    scope: SensorScope,
    descriptor: &'static SensorDescriptor,
    coordinator: Arc<PoolCoordinator>,
}

impl Sensor {
    pub fn new(
        scope: SensorScope,
        descriptor: &'static SensorDescriptor,
        coordinator: Arc<PoolCoordinator>,
    ) -> Self {
        Self {
            scope,
            descriptor,
            coordinator,
        }
    }

    /// Instantiate every sensor from both descriptor tables.
    pub fn all(coordinator: &Arc<PoolCoordinator>) -> Vec<Sensor> {
        let pool = POOL_SENSORS
            .iter()
            .map(|descriptor| Sensor::new(SensorScope::Pool, descriptor, coordinator.clone()));
        let user = USER_SENSORS
            .iter()
            .map(|descriptor| Sensor::new(SensorScope::User, descriptor, coordinator.clone()));
        pool.chain(user).collect()
    }

    pub fn unique_id(&self) -> String {
        format!(
            "{UNIQUE_ID_PREFIX}_{}_{}",
            self.scope.as_str(),
            self.descriptor.key
        )
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    /// True iff the snapshot this sensor reads from has been published.
    pub fn available(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Extracted value, or None while the relevant snapshot is absent.
    pub fn value(&self) -> Option<Value> {
        self.snapshot()
            .map(|snapshot| (self.descriptor.value_fn)(&snapshot))
    }

    pub fn extra_attributes(&self) -> Option<Map<String, Value>> {
        let attr_fn = self.descriptor.attr_fn?;
        let snapshot = self.snapshot()?;
        Some(attr_fn(&snapshot))
    }

    /// Wire representation for the bridge API.
    pub fn state(&self) -> SensorState {
        SensorState {
            id: self.unique_id(),
            name: self.descriptor.name.to_string(),
            scope: self.scope.as_str().to_string(),
            available: self.available(),
            value: self.value(),
            unit: self.descriptor.unit.map(str::to_string),
            state_class: self.descriptor.state_class.map(|sc| sc.as_str().to_string()),
            icon: self.descriptor.icon.to_string(),
            attributes: self.extra_attributes(),
        }
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        match self.scope {
            SensorScope::Pool => self.coordinator.pool_snapshot(),
            SensorScope::User => self.coordinator.user_snapshot(),
        }
    }
}

//! Static sensor descriptor tables.
//!
//! Pure data: each descriptor pairs presentation metadata with an
//! extraction function reading one field out of a snapshot. The tables are
//! defined once and never mutated.

use serde_json::{Map, Value};

use super::format::{format_difficulty, format_hashrate, format_timestamp};
use crate::ckstats::Snapshot;

/// Which coordinator snapshot a sensor reads from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SensorScope {
    Pool,
    User,
}

impl SensorScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SensorScope::Pool => "pool",
            SensorScope::User => "user",
        }
    }
}

/// State semantics hint for downstream consumers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

impl StateClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StateClass::Measurement => "measurement",
            StateClass::TotalIncreasing => "total_increasing",
        }
    }
}

/// Immutable description of one sensor.
pub struct SensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub state_class: Option<StateClass>,
    pub icon: &'static str,
    pub value_fn: fn(&Snapshot) -> Value,
    pub attr_fn: Option<fn(&Snapshot) -> Map<String, Value>>,
}

impl SensorDescriptor {
    const fn describe(
        key: &'static str,
        name: &'static str,
        icon: &'static str,
        value_fn: fn(&Snapshot) -> Value,
    ) -> Self {
        Self {
            key,
            name,
            unit: None,
            state_class: None,
            icon,
            value_fn,
            attr_fn: None,
        }
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn state_class(mut self, state_class: StateClass) -> Self {
        self.state_class = Some(state_class);
        self
    }

    const fn attributes(mut self, attr_fn: fn(&Snapshot) -> Map<String, Value>) -> Self {
        self.attr_fn = Some(attr_fn);
        self
    }
}

fn raw_attribute(key: &'static str, data: &Snapshot) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert(format!("raw_{key}"), data.or_zero(key));
    attributes
}

/// Pool-wide sensors, sourced from `/pool/current`.
pub const POOL_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor::describe("pool_id", "Pool ID", "mdi:identifier", |data| {
        data.or_unknown("id")
    }),
    SensorDescriptor::describe("pool_runtime", "Pool Runtime", "mdi:clock-outline", |data| {
        data.or_zero("runtime")
    })
    .unit("s")
    .state_class(StateClass::TotalIncreasing),
    SensorDescriptor::describe(
        "pool_timestamp",
        "Pool Last Update",
        "mdi:clock-check-outline",
        |data| data.or_unknown("timestamp"),
    ),
    SensorDescriptor::describe("pool_users", "Connected Users", "mdi:account-multiple", |data| {
        data.or_zero("users")
    })
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_workers", "Connected Workers", "mdi:lan-connect", |data| {
        data.or_zero("workers")
    })
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_idle", "Idle Workers", "mdi:sleep", |data| {
        data.or_zero("idle")
    })
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe(
        "pool_disconnected",
        "Disconnected Workers",
        "mdi:lan-disconnect",
        |data| data.or_zero("disconnected"),
    )
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_hashrate_1m", "Pool Hashrate (1m)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate1m")))
    }),
    SensorDescriptor::describe("pool_hashrate_5m", "Pool Hashrate (5m)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate5m")))
    }),
    SensorDescriptor::describe(
        "pool_hashrate_15m",
        "Pool Hashrate (15m)",
        "mdi:speedometer",
        |data| Value::from(format_hashrate(data.num("hashrate15m"))),
    ),
    SensorDescriptor::describe("pool_hashrate_1h", "Pool Hashrate (1h)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate1hr")))
    }),
    SensorDescriptor::describe("pool_hashrate_6h", "Pool Hashrate (6h)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate6hr")))
    }),
    SensorDescriptor::describe("pool_hashrate_1d", "Pool Hashrate (24h)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate1d")))
    }),
    SensorDescriptor::describe("pool_hashrate_7d", "Pool Hashrate (7d)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate7d")))
    }),
    SensorDescriptor::describe("pool_difficulty", "Network Difficulty", "mdi:target", |data| {
        data.or_zero("diff")
    })
    .unit("%")
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_best_share", "Best Share Difficulty", "mdi:star", |data| {
        Value::from(format_difficulty(data.num("bestshare")))
    })
    .attributes(|data| raw_attribute("bestshare", data)),
    SensorDescriptor::describe(
        "pool_shares_accepted",
        "Total Shares Accepted",
        "mdi:check-circle",
        |data| data.or_zero("accepted"),
    )
    .state_class(StateClass::TotalIncreasing),
    SensorDescriptor::describe(
        "pool_shares_rejected",
        "Total Shares Rejected",
        "mdi:close-circle",
        |data| data.or_zero("rejected"),
    )
    .state_class(StateClass::TotalIncreasing),
    SensorDescriptor::describe("pool_sps_1m", "Shares Per Second (1m)", "mdi:share", |data| {
        data.or_zero("SPS1m")
    })
    .unit("SPS")
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_sps_5m", "Shares Per Second (5m)", "mdi:share", |data| {
        data.or_zero("SPS5m")
    })
    .unit("SPS")
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_sps_15m", "Shares Per Second (15m)", "mdi:share", |data| {
        data.or_zero("SPS15m")
    })
    .unit("SPS")
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe("pool_sps_1h", "Shares Per Second (1h)", "mdi:share", |data| {
        data.or_zero("SPS1h")
    })
    .unit("SPS")
    .state_class(StateClass::Measurement),
];

/// Primary-user sensors, sourced from `/users`.
pub const USER_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor::describe("user_address", "User Address", "mdi:wallet", |data| {
        data.or_unknown("userAddress")
    }),
    SensorDescriptor::describe("user_hashrate_1h", "User Hashrate (1h)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate1hr")))
    }),
    SensorDescriptor::describe("user_hashrate_1d", "User Hashrate (24h)", "mdi:speedometer", |data| {
        Value::from(format_hashrate(data.num("hashrate1d")))
    }),
    SensorDescriptor::describe("user_shares", "User Total Shares", "mdi:share", |data| {
        data.or_zero("shares")
    })
    .state_class(StateClass::TotalIncreasing),
    SensorDescriptor::describe(
        "user_best_share",
        "User Best Share Difficulty",
        "mdi:star",
        |data| Value::from(format_difficulty(data.num("bestEver"))),
    )
    .attributes(|data| raw_attribute("bestEver", data)),
    SensorDescriptor::describe("user_workers", "User Worker Count", "mdi:lan-connect", |data| {
        data.or_zero("workerCount")
    })
    .state_class(StateClass::Measurement),
    SensorDescriptor::describe(
        "user_last_share",
        "User Last Share Time",
        "mdi:clock-outline",
        |data| Value::from(format_timestamp(data.num("lastShare"))),
    )
    .attributes(|data| raw_attribute("lastShare", data)),
];

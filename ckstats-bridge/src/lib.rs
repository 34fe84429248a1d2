//! Bridge between a ckpool/ckstats statistics server and sensor consumers.
//!
//! The daemon polls the ckstats HTTP API on a fixed interval, normalizes the
//! responses into immutable snapshots, and republishes the derived sensor
//! states over its own HTTP API.

pub mod api;
pub mod api_client;
pub mod ckstats;
pub mod config;
pub mod coordinator;
pub mod sensor;

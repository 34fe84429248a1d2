//! HTTP API of the bridge daemon.

mod server;
mod v0;

pub use server::{SharedState, router, serve};

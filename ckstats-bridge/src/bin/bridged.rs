//! Bridge daemon for ckpool/ckstats statistics.
//!
//! Setup order matters: config validation, a connectivity check against the
//! pool's health endpoint, then a mandatory first refresh. Any failure in
//! that sequence aborts startup. After setup the poll loop only degrades on
//! failure, it never exits.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ckstats_bridge::api::{self, SharedState};
use ckstats_bridge::ckstats::{StatsApi, StatsClient};
use ckstats_bridge::config::BridgeConfig;
use ckstats_bridge::coordinator::PoolCoordinator;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BridgeConfig::from_env()?;
    info!("Connecting to pool stats API at {}", config.pool_base_url());

    let client = StatsClient::new(&config.pool_host, config.pool_port)?;
    client
        .health()
        .await
        .context("pool connection validation failed")?;

    let coordinator = Arc::new(PoolCoordinator::new(
        Arc::new(client),
        config.poll_interval,
        config.user_address.clone(),
    ));
    coordinator
        .first_refresh()
        .await
        .context("initial pool refresh failed")?;
    info!(
        "Initial snapshot published; polling every {}s",
        config.poll_interval.as_secs()
    );

    let cancel = CancellationToken::new();
    let poll_task = tokio::spawn(coordinator.clone().run(cancel.clone()));

    let state = SharedState::new(coordinator, config.clone());
    let serve_task = tokio::spawn(api::serve(state, config.listen_addr, cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    cancel.cancel();

    poll_task.await?;
    serve_task.await??;
    Ok(())
}

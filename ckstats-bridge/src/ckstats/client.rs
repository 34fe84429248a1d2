//! HTTP client for the ckstats pool statistics API.
//!
//! A thin fetch layer: bounded-timeout GETs returning parsed JSON. Retries
//! are deliberately absent; a failed cycle is picked up by the next poll.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const POOL_CURRENT_ENDPOINT: &str = "/pool/current";
pub const USERS_ENDPOINT: &str = "/users";
pub const HEALTH_ENDPOINT: &str = "/health";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("pool stats API unreachable: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("pool stats API returned HTTP {status} for {path}")]
    BadStatus {
        path: &'static str,
        status: StatusCode,
    },

    #[error("pool stats API returned invalid JSON for {path}: {source}")]
    Protocol {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetch surface of the ckstats server.
///
/// The coordinator is written against this trait so tests can drive it with
/// a scripted implementation instead of a live server.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Fetch the current pool-wide statistics object.
    async fn pool_current(&self) -> Result<Value, StatsError>;

    /// Fetch the list of connected user records.
    async fn users(&self) -> Result<Value, StatsError>;

    /// Connectivity check; succeeds iff the server answers 200.
    async fn health(&self) -> Result<(), StatsError>;
}

/// reqwest-backed [`StatsApi`] implementation.
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(host: &str, port: u16) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StatsError::Connection)?;
        Ok(Self {
            http,
            base_url: format!("http://{host}:{port}"),
        })
    }

    async fn get(&self, path: &'static str) -> Result<reqwest::Response, StatsError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(StatsError::Connection)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::BadStatus { path, status });
        }
        Ok(response)
    }

    async fn get_json(&self, path: &'static str) -> Result<Value, StatsError> {
        self.get(path)
            .await?
            .json()
            .await
            .map_err(|source| StatsError::Protocol { path, source })
    }
}

#[async_trait]
impl StatsApi for StatsClient {
    async fn pool_current(&self) -> Result<Value, StatsError> {
        self.get_json(POOL_CURRENT_ENDPOINT).await
    }

    async fn users(&self) -> Result<Value, StatsError> {
        self.get_json(USERS_ENDPOINT).await
    }

    async fn health(&self) -> Result<(), StatsError> {
        self.get(HEALTH_ENDPOINT).await.map(|_| ())
    }
}

//! HTTP client for the bridge daemon's API.
//!
//! Used by the `ckbridge` CLI; kept alongside the DTOs so the server and
//! its clients share one contract.

pub mod types;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;

use types::{BridgeState, RefreshResponse, SensorState};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7790";

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn get_bridge(&self) -> Result<BridgeState> {
        self.get_json("/bridge").await
    }

    pub async fn get_sensors(&self) -> Result<Vec<SensorState>> {
        self.get_json("/sensors").await
    }

    pub async fn get_sensor(&self, id: &str) -> Result<SensorState> {
        self.get_json(&format!("/sensors/{id}")).await
    }

    pub async fn refresh(&self) -> Result<RefreshResponse> {
        let response = self
            .http
            .post(self.url("/refresh"))
            .send()
            .await
            .context("bridge API unreachable")?;
        if !response.status().is_success() {
            bail!("bridge API returned HTTP {}", response.status());
        }
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v0{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .context("bridge API unreachable")?;
        if !response.status().is_success() {
            bail!("bridge API returned HTTP {}", response.status());
        }
        Ok(response.json().await?)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

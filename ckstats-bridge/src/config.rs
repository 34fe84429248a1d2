//! Bridge configuration.
//!
//! Configuration is collected once at startup from `CKBRIDGE_*` environment
//! variables and is immutable for the life of the daemon.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_POOL_HOST: &str = "localhost";
pub const DEFAULT_POOL_PORT: u16 = 5000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7790";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pool host must be a non-empty hostname")]
    InvalidHost,

    #[error("pool port must be in 1-65535, got {0:?}")]
    InvalidPort(String),

    #[error("poll interval must be a positive number of seconds, got {0:?}")]
    InvalidInterval(String),

    #[error("invalid listen address {0:?}")]
    InvalidListenAddr(String),
}

/// Immutable daemon configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Hostname of the ckstats server.
    pub pool_host: String,

    /// Port of the ckstats server.
    pub pool_port: u16,

    /// Interval between poll cycles.
    pub poll_interval: Duration,

    /// Wallet address selecting the primary user. When unset the first
    /// entry of the `/users` list is used.
    pub user_address: Option<String>,

    /// Address the bridge API listens on.
    pub listen_addr: SocketAddr,
}

impl BridgeConfig {
    /// Load configuration from `CKBRIDGE_*` environment variables,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pool_host = get("CKBRIDGE_POOL_HOST").unwrap_or_else(|| DEFAULT_POOL_HOST.to_string());
        if pool_host.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }

        let pool_port = match get("CKBRIDGE_POOL_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => DEFAULT_POOL_PORT,
        };

        let poll_interval = match get("CKBRIDGE_POLL_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs != 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidInterval(raw))?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let user_address = get("CKBRIDGE_USER_ADDRESS").filter(|addr| !addr.trim().is_empty());

        let raw_listen =
            get("CKBRIDGE_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_listen
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidListenAddr(raw_listen))?;

        Ok(Self {
            pool_host,
            pool_port,
            poll_interval,
            user_address,
            listen_addr,
        })
    }

    /// Base URL of the ckstats server.
    pub fn pool_base_url(&self) -> String {
        format!("http://{}:{}", self.pool_host, self.pool_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BridgeConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.pool_host, DEFAULT_POOL_HOST);
        assert_eq!(config.pool_port, DEFAULT_POOL_PORT);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.user_address, None);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
    }

    #[test]
    fn whitespace_host_rejected() {
        let err = load(&[("CKBRIDGE_POOL_HOST", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost));
    }

    #[test]
    fn port_bounds_enforced() {
        assert!(matches!(
            load(&[("CKBRIDGE_POOL_PORT", "0")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            load(&[("CKBRIDGE_POOL_PORT", "70000")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            load(&[("CKBRIDGE_POOL_PORT", "stratum")]),
            Err(ConfigError::InvalidPort(_))
        ));
        let config = load(&[("CKBRIDGE_POOL_PORT", "65535")]).unwrap();
        assert_eq!(config.pool_port, 65535);
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(matches!(
            load(&[("CKBRIDGE_POLL_INTERVAL_SECS", "0")]),
            Err(ConfigError::InvalidInterval(_))
        ));
        let config = load(&[("CKBRIDGE_POLL_INTERVAL_SECS", "60")]).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn blank_user_address_treated_as_unset() {
        let config = load(&[("CKBRIDGE_USER_ADDRESS", "")]).unwrap();
        assert_eq!(config.user_address, None);

        let config = load(&[("CKBRIDGE_USER_ADDRESS", "bc1qexample")]).unwrap();
        assert_eq!(config.user_address.as_deref(), Some("bc1qexample"));
    }

    #[test]
    fn pool_base_url_built_from_host_and_port() {
        let config = load(&[("CKBRIDGE_POOL_HOST", "pool.lan")]).unwrap();
        assert_eq!(config.pool_base_url(), "http://pool.lan:5000");
    }
}

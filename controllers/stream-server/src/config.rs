//! Server configuration from environment variables.

use crate::error::ServerError;
use slurm_stream::BridgeConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_SLURM_URL: &str = "http://localhost:6820";
const DEFAULT_API_VERSION: &str = "v0.0.44";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub slurm_url: String,
    pub api_version: String,
    pub token: Option<String>,
    pub user_name: Option<String>,
    pub listen_addr: SocketAddr,
    pub bridge: BridgeConfig,
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = BridgeConfig::default();

        let listen_raw = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_raw.parse().map_err(|e| {
            ServerError::InvalidConfig(format!("LISTEN_ADDR must be host:port, got {:?}: {}", listen_raw, e))
        })?;

        let poll_interval = match number(&get, "POLL_INTERVAL_SECS")? {
            Some(0) => return Err(ServerError::InvalidConfig("POLL_INTERVAL_SECS must be greater than zero".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.poll_interval,
        };
        let min_poll_interval = number(&get, "MIN_POLL_INTERVAL_SECS")?
            .map_or(defaults.min_poll_interval, Duration::from_secs);
        let buffer_size = match number(&get, "EVENT_BUFFER_SIZE")? {
            Some(0) => return Err(ServerError::InvalidConfig("EVENT_BUFFER_SIZE must be greater than zero".to_string())),
            Some(size) => usize::try_from(size)
                .map_err(|_| ServerError::InvalidConfig(format!("EVENT_BUFFER_SIZE too large: {}", size)))?,
            None => defaults.buffer_size,
        };
        let max_stream_duration = match number(&get, "MAX_STREAM_DURATION_SECS")? {
            Some(0) => {
                return Err(ServerError::InvalidConfig(
                    "MAX_STREAM_DURATION_SECS must be greater than zero".to_string(),
                ));
            }
            other => other.map(Duration::from_secs),
        };
        let retry_ms = number(&get, "SSE_RETRY_MS")?.unwrap_or(defaults.retry_ms);

        Ok(Self {
            slurm_url: get("SLURM_REST_URL").unwrap_or_else(|| DEFAULT_SLURM_URL.to_string()),
            api_version: get("SLURM_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            token: get("SLURM_JWT"),
            user_name: get("SLURM_USER_NAME"),
            listen_addr,
            bridge: BridgeConfig {
                poll_interval,
                min_poll_interval,
                buffer_size,
                retry_ms,
                max_stream_duration,
            },
        })
    }
}

fn number(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>, ServerError> {
    get(name)
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| {
                ServerError::InvalidConfig(format!("{} must be a non-negative integer, got {:?}", name, raw))
            })
        })
        .transpose()
}

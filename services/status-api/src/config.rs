//! Service configuration
//!
//! Defaults, then `config/status-api.yaml`, then `STATUS_API_*`
//! environment variables, then command-line flags.

use std::net::SocketAddr;

use errors::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/status-api.yaml";
pub const ENV_PREFIX: &str = "STATUS_API_";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_DB_PATH: &str = "data/modbus_db.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    /// State store written by modbus-client
    pub db_path: String,
    pub log_dir: Option<String>,
    /// Separate `api_access` log file
    pub access_log: bool,
    /// JSON lines instead of the bracketed text format
    pub log_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            log_dir: None,
            access_log: true,
            log_json: false,
        }
    }
}

impl ApiConfig {
    pub fn load(path: &str) -> GatewayResult<Self> {
        common::config_loader::load_layered(path, ENV_PREFIX)
    }

    pub fn socket_addr(&self) -> GatewayResult<SocketAddr> {
        self.bind_address
            .parse()
            .map_err(|e| GatewayError::InvalidConfig {
                field: "bind_address".to_string(),
                reason: format!("'{}': {}", self.bind_address, e),
            })
    }

    pub fn validate(&self) -> GatewayResult<()> {
        self.socket_addr()?;
        if self.db_path.trim().is_empty() {
            return Err(GatewayError::InvalidConfig {
                field: "db_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

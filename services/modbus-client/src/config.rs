//! Client configuration
//!
//! Defaults, then `config/modbus-client.yaml`, then `MODBUS_CLIENT_*`
//! environment variables. Command-line flags override the result.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::session::ConnectPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config/modbus-client.yaml";
pub const ENV_PREFIX: &str = "MODBUS_CLIENT_";
pub const DEFAULT_DB_PATH: &str = "data/modbus_db.sqlite";
pub const DEFAULT_PORT: u16 = 502;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// SQLite state store shared with status-api
    pub db_path: String,
    /// Modbus unit (slave) id
    pub unit_id: u8,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Extra attempts for the initial connect
    pub connect_retries: u32,
    pub retry_backoff_ms: u64,
    /// Log root below `GATEWAY_LOG_DIR`
    pub log_dir: Option<String>,
    /// JSON lines instead of the bracketed text format
    pub log_json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            unit_id: 1,
            timeout_ms: 5000,
            connect_retries: 0,
            retry_backoff_ms: 1000,
            log_dir: None,
            log_json: false,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &str) -> Result<Self> {
        let config: Self = common::config_loader::load_layered(path, ENV_PREFIX)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(ClientError::Config("db_path must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_policy(&self) -> ConnectPolicy {
        ConnectPolicy::from_config(self.connect_retries, self.retry_backoff_ms)
    }
}

//! Service bootstrap utilities
//!
//! Startup banner, logging initialization and development environment setup
//! shared by both binaries.

use std::path::PathBuf;

use crate::logging::{self, LogConfig};
use errors::GatewayResult;
use tracing::{info, Level};

/// Service metadata for startup
pub struct ServiceInfo {
    /// Service name (e.g., "modbus-client", "status-api")
    pub name: String,
    /// Service version from Cargo.toml
    pub version: String,
    /// Service description
    pub description: String,
}

impl ServiceInfo {
    /// Create new service info
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
        }
    }

    /// Override the version with the calling binary's own
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Log the startup banner
pub fn print_startup_banner(service: &ServiceInfo) {
    info!("==================================================");
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!("==================================================");
}

/// Options the binaries pass through to the logger
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Default filter directive (`-l/--log-level`)
    pub level: String,
    /// Log directory from configuration, below the env override
    pub log_dir: Option<String>,
    /// Mirror to stdout
    pub console: bool,
    /// Split `api_access` events into their own file
    pub api_log: bool,
    /// JSON lines in the log files
    pub json: bool,
}

/// Initialize logging for a service
///
/// Log root directory priority:
/// 1. GATEWAY_LOG_DIR environment variable
/// 2. `options.log_dir`
/// 3. Default "logs"
pub fn init_logging(service: &ServiceInfo, options: &LoggingOptions) -> GatewayResult<PathBuf> {
    logging::init_log_root(options.log_dir.as_deref());
    let log_dir = logging::get_log_root().join(&service.name);

    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir: log_dir.clone(),
        level: options.level.clone(),
        console: options.console,
        enable_json: options.json,
        enable_api_log: options.api_log,
        api_log_level: Level::INFO,
    };

    logging::init_with_config(log_config)?;
    Ok(log_dir)
}

/// Load environment variables in development mode
///
/// In debug builds, reads `.env` and sets variables that are not already set.
/// No-op in release builds.
pub fn load_development_env() {
    #[cfg(debug_assertions)]
    {
        if let Ok(content) = std::fs::read_to_string(".env") {
            for (key, value) in parse_env_lines(&content) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

/// `KEY=VALUE` pairs, skipping comments and blank lines
fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_service_info_creation() {
        let service = ServiceInfo::new("status-api", "Cached device status over HTTP");
        assert_eq!(service.name, "status-api");
        assert_eq!(service.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_parse_env_lines() {
        let content = "# comment\nSTATUS_API_DB_PATH = data/x.sqlite\n\nnot a pair\nRUST_LOG=debug\n";
        assert_eq!(
            parse_env_lines(content),
            vec![
                ("STATUS_API_DB_PATH", "data/x.sqlite"),
                ("RUST_LOG", "debug")
            ]
        );
    }
}

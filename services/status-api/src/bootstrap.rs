//! Command line, configuration and logging setup

use clap::Parser;
use common::service_bootstrap::{self, LoggingOptions, ServiceInfo};
use errors::GatewayResult;
use tracing::info;

use crate::config::{ApiConfig, DEFAULT_CONFIG_PATH};

/// Command-line arguments for status-api
#[derive(Parser, Debug, Clone)]
#[command(
    name = "status-api",
    version = env!("CARGO_PKG_VERSION"),
    about = "Read-only HTTP view of the cached Modbus blocks",
    long_about = None
)]
pub struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Bind address, e.g. 0.0.0.0:8000
    #[arg(short = 'b', long)]
    pub bind_address: Option<String>,

    /// State store path
    #[arg(long, env = "MODBUS_DB_PATH")]
    pub db_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,
}

pub fn service_info() -> ServiceInfo {
    ServiceInfo::new("status-api", "Read-only HTTP view of the cached Modbus blocks")
        .with_version(env!("CARGO_PKG_VERSION"))
}

/// Load configuration; CLI > ENV > YAML > defaults
pub fn resolve_config(args: &Args) -> GatewayResult<ApiConfig> {
    let mut config = ApiConfig::load(&args.config)?;
    if let Some(addr) = &args.bind_address {
        info!("Using bind address from command line: {}", addr);
        config.bind_address = addr.clone();
    }
    if let Some(db_path) = &args.db_path {
        config.db_path = db_path.clone();
    }
    config.validate()?;
    Ok(config)
}

pub fn initialize_logging(
    args: &Args,
    config: &ApiConfig,
    service: &ServiceInfo,
) -> GatewayResult<()> {
    service_bootstrap::load_development_env();

    let options = LoggingOptions {
        level: args.log_level.clone(),
        log_dir: config.log_dir.clone(),
        console: true,
        api_log: config.access_log,
        json: config.log_json,
    };
    service_bootstrap::init_logging(service, &options)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::try_parse_from([
            "status-api",
            "--config",
            "does/not/exist.yaml",
            "-b",
            "127.0.0.1:9000",
            "--db-path",
            "/tmp/gateway.sqlite",
        ])
        .unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.db_path, "/tmp/gateway.sqlite");
    }
}

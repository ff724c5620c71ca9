//! Command line and logging setup

use clap::Parser;
use common::service_bootstrap::{self, LoggingOptions, ServiceInfo};

use crate::config::{ClientConfig, DEFAULT_CONFIG_PATH, DEFAULT_PORT};
use crate::error::{ClientError, Result};

/// Command-line arguments for modbus-client
#[derive(Parser, Debug, Clone)]
#[command(
    name = "modbus-client",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive Modbus TCP block client",
    long_about = None
)]
pub struct Args {
    /// Modbus server IP address
    #[arg(short = 'i', long, value_name = "IP")]
    pub ip: String,

    /// Modbus server TCP port
    #[arg(
        short = 'p',
        long,
        value_name = "PORT",
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// State store path (overrides configuration)
    #[arg(long, env = "MODBUS_DB_PATH")]
    pub db_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Also log to the terminal
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Talk to a built-in simulated device instead of the network
    #[arg(long)]
    pub simulate: bool,
}

pub fn service_info() -> ServiceInfo {
    ServiceInfo::new("modbus-client", "Interactive Modbus TCP block client")
        .with_version(env!("CARGO_PKG_VERSION"))
}

/// Load configuration and apply command-line overrides
pub fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(&args.config)?;
    if let Some(db_path) = &args.db_path {
        config.db_path = db_path.clone();
    }
    config.validate()?;
    Ok(config)
}

/// File logging always; the terminal only with `--verbose` so log lines
/// stay out of the menu
pub fn initialize_logging(args: &Args, config: &ClientConfig, service: &ServiceInfo) -> Result<()> {
    service_bootstrap::load_development_env();

    let options = LoggingOptions {
        level: args.log_level.clone(),
        log_dir: config.log_dir.clone(),
        console: args.verbose,
        api_log: false,
        json: config.log_json,
    };
    service_bootstrap::init_logging(service, &options)
        .map(|_| ())
        .map_err(|e| ClientError::Config(e.to_string()))
}

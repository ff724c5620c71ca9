//! Layered configuration loading
//!
//! Priority: Env > YAML file > struct defaults. CLI overrides are applied by
//! each binary after loading.

use std::path::Path;

use errors::{GatewayError, GatewayResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

/// Load a configuration struct from defaults, an optional YAML file and
/// prefixed environment variables
///
/// A missing file is not an error. Environment keys are lower-cased after the
/// prefix is stripped, so `STATUS_API_DB_PATH` maps to `db_path`.
pub fn load_layered<T>(path: impl AsRef<Path>, env_prefix: &str) -> GatewayResult<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let path = path.as_ref();

    if path.exists() {
        info!("Loading configuration from {}", path.display());
    } else {
        debug!("No config file at {}, using defaults", path.display());
    }

    Figment::from(Serialized::defaults(T::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(env_prefix))
        .extract()
        .map_err(|e| GatewayError::Configuration(format!("Failed to load configuration: {}", e)))
}

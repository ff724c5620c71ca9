//! Gateway basic library
//!
//! Provides plumbing shared by the interactive client and the HTTP facade:
//! - logging functions
//! - SQLite connection setup
//! - layered configuration loading
//! - startup banner and shutdown signals

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod config_loader;
pub mod logging;
pub mod service_bootstrap;
pub mod shutdown;

//! Device transport seam
//!
//! The session and sync engine only see [`ModbusTransport`]; the wire
//! protocol lives behind it. Two implementations:
//! - [`tcp`]: tokio-modbus over TCP
//! - [`memory`]: an in-process device for tests and `--simulate`

pub mod identity;
pub mod memory;
pub mod tcp;

use std::fmt;

use async_trait::async_trait;
use block_model::{BlockKind, BlockValues};

use crate::error::{ClientError, Result};

pub use identity::{parse_device_identity, DeviceIdentity};
pub use memory::{MemoryConnector, MemoryDevice, MemoryTransport};
pub use tcp::{TcpConnector, TcpTransport};

/// Device address as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Key of the device's row in the state store
    pub fn ip(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// One open link to a device
#[async_trait]
pub trait ModbusTransport: Send {
    /// Read `count` channels of a block starting at `base`
    async fn read_block(&mut self, kind: BlockKind, base: u16, count: u16) -> Result<BlockValues>;

    /// Write a full block starting at `base`
    ///
    /// Read-only blocks are rejected before anything is sent.
    async fn write_block(&mut self, kind: BlockKind, base: u16, values: &BlockValues)
        -> Result<()>;

    /// Read Device Identification, basic category
    async fn read_identity(&mut self) -> Result<DeviceIdentity>;

    /// Release the link; further calls fail
    async fn close(&mut self) -> Result<()>;
}

/// Opens transports for the session
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: ModbusTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport>;
}

/// Shared guard for write requests
pub(crate) fn ensure_writable(kind: BlockKind, values: &BlockValues) -> Result<()> {
    if !kind.is_writable() {
        return Err(ClientError::protocol(
            format!("write {}", kind.label()),
            "block is read-only",
        ));
    }
    values.check(kind)?;
    Ok(())
}

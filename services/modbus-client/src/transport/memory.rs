//! In-process Modbus device
//!
//! Holds the four blocks in memory and answers like a well-behaved slave.
//! Tests inject failures per block and inspect call counters; `--simulate`
//! runs the client against it without hardware.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use block_model::{BlockKind, BlockSnapshot, BlockValues};
use tracing::debug;

use super::identity::{encode_basic_response, parse_device_identity, DeviceIdentity};
use super::{ensure_writable, Connector, Endpoint, ModbusTransport};
use crate::error::{ClientError, Result};

#[derive(Debug)]
struct DeviceState {
    blocks: HashMap<BlockKind, BlockValues>,
    identity: DeviceIdentity,
    failing_reads: HashSet<BlockKind>,
    failing_writes: HashSet<BlockKind>,
    failing_identity: bool,
    refused_connections: u32,
    link_down: bool,
    reads: HashMap<BlockKind, usize>,
    writes: HashMap<BlockKind, usize>,
    connects: usize,
}

/// Shared handle on a simulated device
///
/// Clones observe and mutate the same device.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDevice {
    /// Device with distinguishable default contents
    pub fn new() -> Self {
        let blocks = HashMap::from([
            (
                BlockKind::DiscreteInputs,
                BlockValues::Bits(vec![true, false, true, false]),
            ),
            (BlockKind::Coils, BlockValues::Bits(vec![false; 4])),
            (
                BlockKind::InputRegisters,
                BlockValues::Registers(vec![10, 20, 30, 40, 50, 60, 70, 80]),
            ),
            (
                BlockKind::HoldingRegisters,
                BlockValues::Registers(vec![0; 8]),
            ),
        ]);

        Self {
            state: Arc::new(Mutex::new(DeviceState {
                blocks,
                identity: DeviceIdentity {
                    vendor: "Simulated".to_string(),
                    product: "SIM-4x8".to_string(),
                    revision: "1.0".to_string(),
                },
                failing_reads: HashSet::new(),
                failing_writes: HashSet::new(),
                failing_identity: false,
                refused_connections: 0,
                link_down: false,
                reads: HashMap::new(),
                writes: HashMap::new(),
                connects: 0,
            })),
        }
    }

    /// Device preloaded with a full snapshot
    pub fn with_snapshot(snapshot: &BlockSnapshot) -> Self {
        let device = Self::new();
        for kind in BlockKind::ALL {
            device.set_block(kind, snapshot.get(kind));
        }
        device
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_block(&self, kind: BlockKind, values: BlockValues) {
        self.lock().blocks.insert(kind, values);
    }

    pub fn block(&self, kind: BlockKind) -> Option<BlockValues> {
        self.lock().blocks.get(&kind).cloned()
    }

    pub fn set_identity(&self, identity: DeviceIdentity) {
        self.lock().identity = identity;
    }

    /// Answer reads of `kind` with an exception
    pub fn fail_reads(&self, kind: BlockKind) {
        self.lock().failing_reads.insert(kind);
    }

    /// Answer writes to `kind` with an exception
    pub fn fail_writes(&self, kind: BlockKind) {
        self.lock().failing_writes.insert(kind);
    }

    pub fn fail_identity(&self) {
        self.lock().failing_identity = true;
    }

    /// Refuse the next `count` connection attempts
    pub fn refuse_connections(&self, count: u32) {
        self.lock().refused_connections = count;
    }

    /// Drop the link; every later request fails as a lost connection
    pub fn drop_link(&self) {
        self.lock().link_down = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failing_reads.clear();
        state.failing_writes.clear();
        state.failing_identity = false;
        state.refused_connections = 0;
        state.link_down = false;
    }

    pub fn read_count(&self, kind: BlockKind) -> usize {
        self.lock().reads.get(&kind).copied().unwrap_or(0)
    }

    pub fn write_count(&self, kind: BlockKind) -> usize {
        self.lock().writes.get(&kind).copied().unwrap_or(0)
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }
}

/// Connector handing out transports bound to one [`MemoryDevice`]
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    pub device: MemoryDevice,
}

impl MemoryConnector {
    pub fn new(device: MemoryDevice) -> Self {
        Self { device }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<MemoryTransport> {
        let mut state = self.device.lock();
        state.connects += 1;
        if state.refused_connections > 0 {
            state.refused_connections -= 1;
            return Err(ClientError::Connection {
                endpoint: endpoint.to_string(),
                reason: "Connection refused".to_string(),
            });
        }
        state.link_down = false;
        drop(state);

        debug!("Simulated device attached for {}", endpoint);
        Ok(MemoryTransport {
            device: self.device.clone(),
            endpoint: endpoint.to_string(),
            open: true,
        })
    }
}

/// Transport over a [`MemoryDevice`]
#[derive(Debug)]
pub struct MemoryTransport {
    device: MemoryDevice,
    endpoint: String,
    open: bool,
}

impl MemoryTransport {
    pub fn new(device: MemoryDevice) -> Self {
        Self {
            device,
            endpoint: "memory".to_string(),
            open: true,
        }
    }

    fn check_link(&self, operation: &str, link_down: bool) -> Result<()> {
        if !self.open {
            return Err(ClientError::NotConnected);
        }
        if link_down {
            return Err(ClientError::Connection {
                endpoint: self.endpoint.clone(),
                reason: format!("{}: connection reset", operation),
            });
        }
        Ok(())
    }
}

fn ensure_in_range(operation: &str, kind: BlockKind, base: u16, count: usize) -> Result<()> {
    let start = usize::from(base);
    let first = usize::from(kind.base_address());
    if count == 0 || start < first || start + count > first + kind.width() {
        return Err(ClientError::protocol(
            operation,
            "device exception IllegalDataAddress",
        ));
    }
    Ok(())
}

#[async_trait]
impl ModbusTransport for MemoryTransport {
    async fn read_block(&mut self, kind: BlockKind, base: u16, count: u16) -> Result<BlockValues> {
        let operation = format!("read {}", kind.label());
        let mut state = self.device.lock();
        self.check_link(&operation, state.link_down)?;
        *state.reads.entry(kind).or_default() += 1;

        if state.failing_reads.contains(&kind) {
            return Err(ClientError::protocol(
                operation,
                "device exception ServerDeviceFailure",
            ));
        }
        ensure_in_range(&operation, kind, base, usize::from(count))?;

        let offset = usize::from(base - kind.base_address());
        let range = offset..offset + usize::from(count);
        let values = match state.blocks.get(&kind) {
            Some(BlockValues::Bits(bits)) => BlockValues::Bits(bits[range].to_vec()),
            Some(BlockValues::Registers(registers)) => {
                BlockValues::Registers(registers[range].to_vec())
            },
            None => {
                return Err(ClientError::protocol(
                    operation,
                    "device exception IllegalDataAddress",
                ))
            },
        };
        Ok(values)
    }

    async fn write_block(
        &mut self,
        kind: BlockKind,
        base: u16,
        values: &BlockValues,
    ) -> Result<()> {
        ensure_writable(kind, values)?;
        let operation = format!("write {}", kind.label());

        let mut state = self.device.lock();
        self.check_link(&operation, state.link_down)?;
        *state.writes.entry(kind).or_default() += 1;

        if state.failing_writes.contains(&kind) {
            return Err(ClientError::protocol(
                operation,
                "device exception ServerDeviceFailure",
            ));
        }
        ensure_in_range(&operation, kind, base, values.len())?;

        state.blocks.insert(kind, values.clone());
        Ok(())
    }

    async fn read_identity(&mut self) -> Result<DeviceIdentity> {
        let operation = "read device identification";
        let state = self.device.lock();
        self.check_link(operation, state.link_down)?;

        if state.failing_identity {
            return Err(ClientError::protocol(
                operation,
                "device exception IllegalFunction",
            ));
        }
        // Round-trip through the wire encoding like a real reply
        parse_device_identity(&encode_basic_response(&state.identity))
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

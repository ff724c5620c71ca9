//! Sync engine: device blocks into the state store
//!
//! The device stays authoritative. The store is a best-effort cache:
//! storage failures are logged and handed back to the caller but never undo
//! a device operation.

use block_model::{BlockKind, BlockSnapshot, BlockValues};
use block_store::{StateStore, StoreError};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::transport::ModbusTransport;

/// Read a whole block from its base address
pub async fn read_full_block<T>(transport: &mut T, kind: BlockKind) -> Result<BlockValues>
where
    T: ModbusTransport + ?Sized,
{
    transport
        .read_block(kind, kind.base_address(), kind.width() as u16)
        .await
}

/// Read all four blocks once and cache them under `ip`
///
/// Stops at the first failed read; nothing is persisted in that case.
pub async fn initial_sync<T>(
    transport: &mut T,
    store: &StateStore,
    ip: &str,
) -> Result<BlockSnapshot>
where
    T: ModbusTransport + ?Sized,
{
    let mut blocks = Vec::with_capacity(BlockKind::ALL.len());
    for kind in BlockKind::ALL {
        match read_full_block(transport, kind).await {
            Ok(values) => blocks.push((kind, values)),
            Err(e) => {
                warn!("Initial sync of {} aborted at {}: {}", ip, kind.label(), e);
                return Err(e);
            },
        }
    }

    let snapshot = BlockSnapshot::from_blocks(blocks)?;
    if let Err(e) = store.upsert_snapshot(ip, &snapshot).await {
        warn!("Initial snapshot of {} not cached: {}", ip, e);
        return Err(e.into());
    }

    info!("Initial sync of {} cached", ip);
    Ok(snapshot)
}

/// Cache the values just written to one block
pub async fn persist_write(
    store: &StateStore,
    ip: &str,
    kind: BlockKind,
    values: &BlockValues,
) -> std::result::Result<(), StoreError> {
    match store.update_field(ip, kind, values).await {
        Ok(()) => {
            debug!("Cached {} = {} for {}", kind, values.encode(), ip);
            Ok(())
        },
        Err(e) => {
            warn!("Write to {} on {} not cached: {}", kind.label(), ip, e);
            Err(e)
        },
    }
}

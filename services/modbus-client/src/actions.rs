//! Menu actions against the open transport and the state store
//!
//! Nothing here prints; the console renders the returned values.

use block_model::{split_tokens, validate_discrete_write, validate_register_write};
use block_model::{BlockKind, BlockValues};
use block_store::{StateStore, StoreError};
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::sync::{persist_write, read_full_block};
use crate::transport::ModbusTransport;

/// Read one block
pub async fn read_block<T>(transport: &mut T, kind: BlockKind) -> Result<BlockValues>
where
    T: ModbusTransport + ?Sized,
{
    read_full_block(transport, kind).await
}

/// Read every block; a failed block does not stop the others
pub async fn read_all<T>(transport: &mut T) -> Vec<(BlockKind, Result<BlockValues>)>
where
    T: ModbusTransport + ?Sized,
{
    let mut results = Vec::with_capacity(BlockKind::ALL.len());
    for kind in BlockKind::ALL {
        results.push((kind, read_full_block(transport, kind).await));
    }
    results
}

/// Validated operator input, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub kind: BlockKind,
    /// Tokens as typed, echoed back before sending
    pub tokens: Vec<String>,
    pub values: BlockValues,
}

/// Validate a comma-separated input line for a writable block
pub fn prepare_write(kind: BlockKind, line: &str) -> Result<PendingWrite> {
    let tokens = split_tokens(line);
    let values = match kind {
        BlockKind::Coils => BlockValues::Bits(validate_discrete_write(&tokens)?),
        BlockKind::HoldingRegisters => BlockValues::Registers(validate_register_write(&tokens)?),
        BlockKind::DiscreteInputs | BlockKind::InputRegisters => {
            return Err(ClientError::protocol(
                format!("write {}", kind.label()),
                "block is read-only",
            ))
        },
    };

    Ok(PendingWrite {
        kind,
        tokens: tokens.into_iter().map(str::to_string).collect(),
        values,
    })
}

/// Result of a write the device accepted
#[derive(Debug)]
pub struct WriteOutcome {
    pub written: PendingWrite,
    /// Set when the written values could not be cached
    pub storage_warning: Option<StoreError>,
    /// Post-write read of the same block; shown, not reconciled
    pub readback: Result<BlockValues>,
}

/// Send a validated write, cache what was sent, then read the block back
///
/// Fails only if the device rejects the write; nothing is cached then.
pub async fn execute_write<T>(
    transport: &mut T,
    store: &StateStore,
    ip: &str,
    pending: PendingWrite,
) -> Result<WriteOutcome>
where
    T: ModbusTransport + ?Sized,
{
    let kind = pending.kind;
    transport
        .write_block(kind, kind.base_address(), &pending.values)
        .await?;
    info!("Wrote {} to {}: {}", kind.label(), ip, pending.values.encode());

    let storage_warning = persist_write(store, ip, kind, &pending.values).await.err();
    let readback = read_full_block(transport, kind).await;
    if let Err(e) = &readback {
        warn!("Read-back of {} failed: {}", kind.label(), e);
    }

    Ok(WriteOutcome {
        written: pending,
        storage_warning,
        readback,
    })
}

/// Create or update a credential; returns the stored username
pub async fn create_user(store: &StateStore, username: &str, password: &str) -> Result<String> {
    let username = username.trim();
    store.upsert_credential(username, password.trim()).await?;
    info!("Credential for '{}' stored", username);
    Ok(username.to_string())
}

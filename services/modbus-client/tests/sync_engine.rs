//! Sync engine and write path against the in-memory device

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use block_model::{BlockKind, BlockSnapshot, BlockValues};
use block_store::{StateStore, StoreError};
use modbus_client::actions::{create_user, execute_write, prepare_write};
use modbus_client::sync::{initial_sync, persist_write};
use modbus_client::transport::{MemoryDevice, MemoryTransport};
use modbus_client::ClientError;
use sqlx::sqlite::SqlitePoolOptions;

const IP: &str = "10.0.0.5";

async fn setup_test_store() -> StateStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    let store = StateStore::from_pool(pool);
    store.ensure_schema().await.expect("Failed to create tables");
    store
}

/// Store whose tables were never created; every statement fails
async fn broken_store() -> StateStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    StateStore::from_pool(pool)
}

fn device_snapshot() -> BlockSnapshot {
    BlockSnapshot::new(
        vec![true, true, false, false],
        vec![false, true, false, true],
        vec![11, 12, 13, 14, 15, 16, 17, 18],
        vec![9, 8, 7, 6, 5, 4, 3, 2],
    )
    .unwrap()
}

#[tokio::test]
async fn test_initial_sync_caches_all_blocks() {
    let store = setup_test_store().await;
    let device = MemoryDevice::with_snapshot(&device_snapshot());
    let mut transport = MemoryTransport::new(device);

    let snapshot = initial_sync(&mut transport, &store, IP).await.unwrap();
    assert_eq!(snapshot, device_snapshot());

    let stored = store.fetch_snapshot(IP).await.unwrap().unwrap();
    assert_eq!(stored.di.as_deref(), Some("1,1,0,0"));
    assert_eq!(stored.co.as_deref(), Some("0,1,0,1"));
    assert_eq!(stored.ir.as_deref(), Some("11,12,13,14,15,16,17,18"));
    assert_eq!(stored.hr.as_deref(), Some("9,8,7,6,5,4,3,2"));
}

#[tokio::test]
async fn test_coil_read_failure_writes_no_row() {
    let store = setup_test_store().await;
    let device = MemoryDevice::new();
    device.fail_reads(BlockKind::Coils);
    let mut transport = MemoryTransport::new(device);

    let err = initial_sync(&mut transport, &store, IP).await.unwrap_err();
    assert!(matches!(err, ClientError::Protocol { .. }));
    assert!(store.current_snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn test_resync_replaces_previous_row() {
    let store = setup_test_store().await;
    let device = MemoryDevice::new();
    let mut transport = MemoryTransport::new(device.clone());
    initial_sync(&mut transport, &store, IP).await.unwrap();

    device.set_block(BlockKind::Coils, BlockValues::Bits(vec![true; 4]));
    initial_sync(&mut transport, &store, IP).await.unwrap();

    let stored = store.fetch_snapshot(IP).await.unwrap().unwrap();
    assert_eq!(stored.co.as_deref(), Some("1,1,1,1"));
}

#[tokio::test]
async fn test_persist_write_touches_one_column() {
    let store = setup_test_store().await;

    persist_write(&store, IP, BlockKind::Coils, &BlockValues::Bits(vec![true, false, true, false]))
        .await
        .unwrap();
    let stored = store.fetch_snapshot(IP).await.unwrap().unwrap();
    assert_eq!(stored.co.as_deref(), Some("1,0,1,0"));
    assert_eq!(stored.di, None);
    assert_eq!(stored.hr, None);

    persist_write(&store, IP, BlockKind::Coils, &BlockValues::Bits(vec![false; 4]))
        .await
        .unwrap();
    let stored = store.fetch_snapshot(IP).await.unwrap().unwrap();
    assert_eq!(stored.co.as_deref(), Some("0,0,0,0"));
    assert_eq!(stored.ir, None);
}

#[tokio::test]
async fn test_write_caches_what_was_sent() {
    let store = setup_test_store().await;
    let device = MemoryDevice::new();
    let mut transport = MemoryTransport::new(device.clone());
    initial_sync(&mut transport, &store, IP).await.unwrap();

    let pending = prepare_write(BlockKind::HoldingRegisters, "3,0,9,0,0,0,0,1").unwrap();
    let outcome = execute_write(&mut transport, &store, IP, pending).await.unwrap();

    let sent = BlockValues::Registers(vec![3, 0, 9, 0, 0, 0, 0, 1]);
    assert!(outcome.storage_warning.is_none());
    assert_eq!(outcome.readback.unwrap(), sent);
    assert_eq!(device.block(BlockKind::HoldingRegisters), Some(sent));

    let stored = store.fetch_snapshot(IP).await.unwrap().unwrap();
    assert_eq!(stored.hr.as_deref(), Some("3,0,9,0,0,0,0,1"));
    // Other columns keep the initial sync
    assert_eq!(stored.ir.as_deref(), Some("10,20,30,40,50,60,70,80"));
}

#[tokio::test]
async fn test_rejected_write_caches_nothing() {
    let store = setup_test_store().await;
    let device = MemoryDevice::new();
    device.fail_writes(BlockKind::Coils);
    let mut transport = MemoryTransport::new(device.clone());

    let pending = prepare_write(BlockKind::Coils, "1,1,1,1").unwrap();
    let err = execute_write(&mut transport, &store, IP, pending).await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol { .. }));
    assert!(!err.is_fatal());
    assert!(store.fetch_snapshot(IP).await.unwrap().is_none());
    assert_eq!(device.read_count(BlockKind::Coils), 0);
}

#[tokio::test]
async fn test_storage_failure_does_not_undo_device_write() {
    let store = broken_store().await;
    let device = MemoryDevice::new();
    let mut transport = MemoryTransport::new(device.clone());

    let pending = prepare_write(BlockKind::Coils, "1,0,0,1").unwrap();
    let outcome = execute_write(&mut transport, &store, IP, pending).await.unwrap();

    assert!(matches!(outcome.storage_warning, Some(StoreError::Database(_))));
    assert_eq!(
        device.block(BlockKind::Coils),
        Some(BlockValues::Bits(vec![true, false, false, true]))
    );
    assert!(outcome.readback.is_ok());
}

#[tokio::test]
async fn test_invalid_input_never_reaches_device() {
    let device = MemoryDevice::new();

    for line in ["1,0,1", "1,0,1,2", "yes,no,1,0", ""] {
        assert!(prepare_write(BlockKind::Coils, line).is_err(), "line {:?}", line);
    }
    for line in ["1,2,3,4,5,6,7", "1,2,3,4,5,6,7,10", "1,2,3,4,5,6,7,-1"] {
        assert!(
            prepare_write(BlockKind::HoldingRegisters, line).is_err(),
            "line {:?}",
            line
        );
    }
    assert_eq!(device.write_count(BlockKind::Coils), 0);
    assert_eq!(device.write_count(BlockKind::HoldingRegisters), 0);
}

#[tokio::test]
async fn test_create_user_trims_and_validates() {
    let store = setup_test_store().await;

    let username = create_user(&store, "  alice ", " s3cret ").await.unwrap();
    assert_eq!(username, "alice");
    assert_eq!(
        store.find_username_by_secret("s3cret").await.unwrap().as_deref(),
        Some("alice")
    );

    let err = create_user(&store, "bob", "   ").await.unwrap_err();
    assert!(matches!(err, ClientError::Storage(StoreError::Validation(_))));
    assert_eq!(store.find_username_by_secret("").await.unwrap(), None);
}

//! Integration tests for credential storage and token lookup

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use block_store::{StateStore, StoreError};
use sqlx::sqlite::SqlitePoolOptions;

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

#[tokio::test]
async fn test_secret_lookup_is_exact() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "s3cret").await.unwrap();

    assert_eq!(
        store.find_username_by_secret("s3cret").await.unwrap(),
        Some("alice".to_string())
    );
    for other in ["S3CRET", "s3cret ", " s3cret", "s3cre", "", "alice"] {
        assert_eq!(
            store.find_username_by_secret(other).await.unwrap(),
            None,
            "{other:?} must not match"
        );
    }
}

#[tokio::test]
async fn test_upsert_replaces_secret() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "old").await.unwrap();
    store.upsert_credential("alice", "new").await.unwrap();

    assert_eq!(store.find_username_by_secret("old").await.unwrap(), None);
    assert_eq!(
        store.find_username_by_secret("new").await.unwrap(),
        Some("alice".to_string())
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_empty_values_rejected() {
    let store = setup_test_store().await;

    assert!(matches!(
        store.upsert_credential("", "secret").await,
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        store.upsert_credential("bob", "").await,
        Err(StoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_shared_secret_resolves_deterministically() {
    let store = setup_test_store().await;
    store.upsert_credential("zoe", "same").await.unwrap();
    store.upsert_credential("adam", "same").await.unwrap();

    assert_eq!(
        store.find_username_by_secret("same").await.unwrap(),
        Some("adam".to_string())
    );
}

use std::path::Path;

use common::sqlite::{SqliteClient, SqlitePool};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema::{CREATE_MODBUS_TABLE, CREATE_TOKENS_TABLE};

/// Handle on the gateway database
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct StateStore {
    pool: SqlitePool,
}

impl StateStore {
    /// Open the database file and create missing tables
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let client = SqliteClient::new(db_path)
            .await
            .map_err(|e| StoreError::Setup(e.to_string()))?;
        let store = Self::from_pool(client.pool().clone());
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool; the caller decides when to create the schema
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both tables if absent
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_MODBUS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_TOKENS_TABLE).execute(&self.pool).await?;
        debug!("Schema ready");
        Ok(())
    }
}

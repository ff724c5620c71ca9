use errors::{GatewayError, GatewayResult};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool as SqlxSqlitePool,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = SqlxSqlitePool;

/// Pooled SQLite handle shared by the state store and the HTTP facade
#[derive(Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Open (or create) the database file
    ///
    /// WAL journal with normal sync keeps the HTTP reader and the interactive
    /// writer from blocking each other; the busy timeout covers the rest.
    pub async fn new(db_path: impl AsRef<Path>) -> GatewayResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                GatewayError::Storage(format!("Failed to open {}: {}", db_path_str, e))
            })?;

        info!("SQLite database connected: {}", db_path_str);

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("modbus_db.sqlite");

        let client = SqliteClient::new(&path).await.unwrap();
        sqlx::query("SELECT 1").execute(client.pool()).await.unwrap();

        assert!(path.exists());
        client.pool().close().await;
    }

    #[tokio::test]
    async fn test_new_uses_wal_journal() {
        let dir = tempfile::tempdir().unwrap();
        let client = SqliteClient::new(dir.path().join("wal.sqlite")).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(client.pool())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}

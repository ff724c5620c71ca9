//! Snapshot persistence - the `modbus` table

use block_model::{BlockKind, BlockSnapshot, BlockValues};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::StateStore;

/// A persisted `modbus` row
///
/// Columns stay as stored text; a row created by a single-field update has
/// the other columns `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredSnapshot {
    pub ip: String,
    pub di: Option<String>,
    pub co: Option<String>,
    pub ir: Option<String>,
    pub hr: Option<String>,
}

impl StoredSnapshot {
    /// Stored text of one column
    pub fn field(&self, kind: BlockKind) -> Option<&str> {
        match kind {
            BlockKind::DiscreteInputs => self.di.as_deref(),
            BlockKind::Coils => self.co.as_deref(),
            BlockKind::InputRegisters => self.ir.as_deref(),
            BlockKind::HoldingRegisters => self.hr.as_deref(),
        }
    }

    /// Decode one column
    pub fn values(&self, kind: BlockKind) -> Result<BlockValues> {
        let text = self.field(kind).ok_or_else(|| StoreError::Missing {
            ip: self.ip.clone(),
            column: kind.column(),
        })?;
        BlockValues::decode(kind, text).map_err(|e| StoreError::Corrupt {
            ip: self.ip.clone(),
            column: kind.column(),
            reason: e.to_string(),
        })
    }

    /// Decode the full row; fails if any column is blank or malformed
    pub fn to_block_snapshot(&self) -> Result<BlockSnapshot> {
        let blocks = BlockKind::ALL
            .iter()
            .map(|&kind| self.values(kind).map(|values| (kind, values)))
            .collect::<Result<Vec<_>>>()?;
        Ok(BlockSnapshot::from_blocks(blocks)?)
    }
}

impl StateStore {
    /// Create or fully replace the row for `ip`
    pub async fn upsert_snapshot(&self, ip: &str, snapshot: &BlockSnapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO modbus (ip, di, co, ir, hr)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(ip) DO UPDATE SET
                di = excluded.di,
                co = excluded.co,
                ir = excluded.ir,
                hr = excluded.hr
            "#,
        )
        .bind(ip)
        .bind(snapshot.get(BlockKind::DiscreteInputs).encode())
        .bind(snapshot.get(BlockKind::Coils).encode())
        .bind(snapshot.get(BlockKind::InputRegisters).encode())
        .bind(snapshot.get(BlockKind::HoldingRegisters).encode())
        .execute(self.pool())
        .await?;

        debug!("Snapshot stored for {}", ip);
        Ok(())
    }

    /// Set exactly one column for `ip`, creating the row if needed
    ///
    /// Insert-or-update is one statement, so a concurrent reader never sees
    /// a row without the new value.
    pub async fn update_field(&self, ip: &str, kind: BlockKind, values: &BlockValues) -> Result<()> {
        values.check(kind)?;

        // Column name comes from the BlockKind whitelist, never from input
        let column = kind.column();
        let sql = format!(
            "INSERT INTO modbus (ip, {column}) VALUES (?, ?) \
             ON CONFLICT(ip) DO UPDATE SET {column} = excluded.{column}"
        );

        sqlx::query(&sql)
            .bind(ip)
            .bind(values.encode())
            .execute(self.pool())
            .await?;

        debug!("Stored {} for {}", column, ip);
        Ok(())
    }

    /// Row for one device address
    pub async fn fetch_snapshot(&self, ip: &str) -> Result<Option<StoredSnapshot>> {
        let row = sqlx::query_as::<_, StoredSnapshot>(
            r#"
            SELECT ip, di, co, ir, hr
            FROM modbus
            WHERE ip = ?
            "#,
        )
        .bind(ip)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// The "current device" row
    ///
    /// Unordered `LIMIT 1`: with several synced devices, which row comes back
    /// is up to SQLite.
    pub async fn current_snapshot(&self) -> Result<Option<StoredSnapshot>> {
        let row = sqlx::query_as::<_, StoredSnapshot>(
            r#"
            SELECT ip, di, co, ir, hr
            FROM modbus
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }
}

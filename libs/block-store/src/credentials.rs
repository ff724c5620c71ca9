//! Credential persistence - the `tokens` table

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::StateStore;

impl StateStore {
    /// Create or replace the secret for `username`
    pub async fn upsert_credential(&self, username: &str, secret: &str) -> Result<()> {
        if username.is_empty() || secret.is_empty() {
            return Err(StoreError::Validation(
                "Username and password cannot be empty.".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO tokens (username, password)
            VALUES (?, ?)
            ON CONFLICT(username) DO UPDATE SET password = excluded.password
            "#,
        )
        .bind(username)
        .bind(secret)
        .execute(self.pool())
        .await?;

        debug!("Credential stored for {}", username);
        Ok(())
    }

    /// Username whose stored secret equals `secret` byte for byte
    ///
    /// If several users share a secret the lowest username wins.
    pub async fn find_username_by_secret(&self, secret: &str) -> Result<Option<String>> {
        if secret.is_empty() {
            return Ok(None);
        }

        let username = sqlx::query_scalar::<_, String>(
            r#"
            SELECT username
            FROM tokens
            WHERE password = ?
            ORDER BY username
            LIMIT 1
            "#,
        )
        .bind(secret)
        .fetch_optional(self.pool())
        .await?;

        Ok(username)
    }
}

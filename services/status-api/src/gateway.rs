//! Access gateway: token check and cached status lookup

use block_store::StateStore;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;

/// A caller whose token matched a stored secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
}

/// Body of `GET /`; block columns are the stored text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub user: String,
    pub ip: String,
    pub di: Option<String>,
    pub co: Option<String>,
    pub ir: Option<String>,
    pub hr: Option<String>,
}

/// Read-only facade over the state store
#[derive(Clone)]
pub struct AccessGateway {
    store: StateStore,
}

impl AccessGateway {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Resolve a bearer token to its user
    ///
    /// Matches the stored secret byte for byte. No expiry, no hashing.
    pub async fn verify_token(&self, token: &str) -> Result<Caller, ApiError> {
        match self.store.find_username_by_secret(token).await? {
            Some(username) => {
                debug!("Token accepted for {}", username);
                Ok(Caller { username })
            },
            None => Err(ApiError::Unauthorized),
        }
    }

    /// The cached row of the current device
    pub async fn get_status(&self, caller: &Caller) -> Result<StatusReport, ApiError> {
        let row = self
            .store
            .current_snapshot()
            .await?
            .ok_or(ApiError::NoData)?;

        Ok(StatusReport {
            user: caller.username.clone(),
            ip: row.ip,
            di: row.di,
            co: row.co,
            ir: row.ir,
            hr: row.hr,
        })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn gateway(with_schema: bool) -> AccessGateway {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = StateStore::from_pool(pool);
        if with_schema {
            store.ensure_schema().await.unwrap();
        }
        AccessGateway::new(store)
    }

    #[tokio::test]
    async fn test_verify_token_matches_secret() {
        let gateway = gateway(true).await;
        gateway.store().upsert_credential("alice", "s3cret").await.unwrap();

        let caller = gateway.verify_token("s3cret").await.unwrap();
        assert_eq!(caller.username, "alice");
        assert!(matches!(
            gateway.verify_token("S3CRET").await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_verify_token_store_failure_is_internal() {
        // No tables: the lookup itself fails
        let gateway = gateway(false).await;

        let err = gateway.verify_token("s3cret").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

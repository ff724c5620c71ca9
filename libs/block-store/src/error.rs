//! Block Store Error Types

use errors::GatewayError;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Block store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Rejected input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored text that no longer decodes
    #[error("Corrupt {column} for {ip}: {reason}")]
    Corrupt {
        ip: String,
        column: &'static str,
        reason: String,
    },

    /// Column never populated
    #[error("No {column} stored for {ip}")]
    Missing { ip: String, column: &'static str },

    /// Connection or schema setup failure
    #[error("Store setup failed: {0}")]
    Setup(String),
}

impl From<block_model::ModelError> for StoreError {
    fn from(err: block_model::ModelError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => GatewayError::Validation(msg),
            other => GatewayError::Storage(other.to_string()),
        }
    }
}

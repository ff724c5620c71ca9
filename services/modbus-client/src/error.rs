//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the device, or the link dropped
    #[error("Connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Exception response, malformed reply or rejected request
    #[error("{operation} failed: {message}")]
    Protocol { operation: String, message: String },

    /// No reply within the per-request timeout
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Operator input rejected before any device call
    #[error(transparent)]
    Validation(#[from] block_model::ModelError),

    #[error(transparent)]
    Storage(#[from] block_store::StoreError),

    #[error("No open device session")]
    NotConnected,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl ClientError {
    pub fn protocol(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Protocol {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Errors after which the session cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Connection { .. } | ClientError::NotConnected | ClientError::Terminal(_)
        )
    }
}

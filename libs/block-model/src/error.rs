//! Block model error types

use thiserror::Error;

/// Result type for block-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Block model errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Wrong number of values for the block
    #[error("expected exactly {expected} values, got {found}")]
    WrongCount { expected: usize, found: usize },

    /// A token outside the accepted alphabet
    #[error("invalid value '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    /// Values of the wrong shape for the block kind
    #[error("{kind} holds {expected}, not {found}")]
    KindMismatch {
        kind: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Unknown block name
    #[error("unknown block '{0}', expected one of di, co, ir, hr")]
    UnknownKind(String),
}

//! Unified error handling for the Modbus block gateway
//!
//! Library crates keep their own error enums and convert into
//! [`GatewayError`] where a service boundary needs one error type: startup
//! plumbing in `common` and the HTTP facade.

use thiserror::Error;

/// Main error type for the gateway services
#[derive(Debug, Error)]
pub enum GatewayError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // ======================================
    // Storage Errors
    // ======================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ======================================
    // Network Errors
    // ======================================
    #[error("Connection failed: {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    // ======================================
    // Validation Errors
    // ======================================
    #[error("Validation failed: {0}")]
    Validation(String),

    // ======================================
    // File & I/O Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using GatewayError
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::ConnectionFailed { .. } => 502,
            Self::Configuration(_) | Self::InvalidConfig { .. } | Self::Storage(_) | Self::Io(_) => {
                500
            },
        }
    }
}

#[cfg(feature = "axum-support")]
impl axum::response::IntoResponse for GatewayError {
    #[allow(clippy::disallowed_methods)] // json! macro internally uses unwrap (safe for known valid JSON)
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::Json;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(GatewayError::Validation("test".into()).status_code(), 400);
        assert_eq!(GatewayError::Storage("disk".into()).status_code(), 500);
        assert_eq!(
            GatewayError::ConnectionFailed {
                endpoint: "0.0.0.0:8000".into(),
                reason: "address in use".into(),
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: GatewayError = std::io::Error::other("disk full").into();
        assert!(matches!(err, GatewayError::Io(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[cfg(feature = "axum-support")]
    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = GatewayError::Storage("no such table: tokens".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}

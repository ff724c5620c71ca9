//! HTTP error responses

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use errors::GatewayError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Challenge sent with every 401
pub const TOKEN_CHALLENGE: &str = "Token realm=\"Authentication Required\"";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or unknown token
    #[error("Unauthorized Access")]
    Unauthorized,

    /// Nothing cached yet
    #[error("No modbus data found")]
    NoData,

    #[error(transparent)]
    Internal(#[from] GatewayError),
}

impl From<block_store::StoreError> for ApiError {
    fn from(err: block_store::StoreError) -> Self {
        ApiError::Internal(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Internal(e) => {
                error!("Request failed: {}", e);
                return e.into_response();
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NoData => StatusCode::NOT_FOUND,
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(TOKEN_CHALLENGE),
            );
        }
        response
    }
}

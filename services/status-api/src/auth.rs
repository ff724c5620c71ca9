//! `Authorization: Token <secret>` extraction

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::gateway::Caller;

/// Authorization scheme, matched case-insensitively
pub const TOKEN_SCHEME: &str = "Token";

/// Token from an `Authorization` header value
///
/// ```
/// # use status_api::auth::parse_token_header;
/// assert_eq!(parse_token_header("Token abc123"), Some("abc123"));
/// assert_eq!(parse_token_header("Bearer abc123"), None);
/// ```
pub fn parse_token_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_token_header)
            .ok_or_else(|| {
                debug!("Request without a usable Authorization header");
                ApiError::Unauthorized
            })?;

        state.gateway.verify_token(token).await
    }
}

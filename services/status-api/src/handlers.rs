//! Request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::gateway::{Caller, StatusReport};

/// `GET /` - cached snapshot of the current device
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<StatusReport>, ApiError> {
    let report = state.gateway.get_status(&caller).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: i64,
}

/// `GET /health` - liveness, no authentication
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "status-api",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

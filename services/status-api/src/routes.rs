//! Router assembly

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::app_state::AppState;
use crate::handlers::{get_status, health_check};

/// All routes with state, CORS and access logging
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_status))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}

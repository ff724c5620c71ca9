//! HTTP tests for the status routes
//!
//! Drives the router with `oneshot` over an in-memory state store.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use block_store::StateStore;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use status_api::{create_routes, AccessGateway, AppState};
use tower::ServiceExt;

async fn setup_test_store() -> StateStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    let store = StateStore::from_pool(pool);
    store.ensure_schema().await.expect("Failed to create tables");
    store
}

fn app(store: &StateStore) -> Router {
    create_routes(Arc::new(AppState::new(AccessGateway::new(store.clone()))))
}

async fn get(app: Router, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri("/");
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn seed_row(store: &StateStore) {
    sqlx::query("INSERT INTO modbus (ip, di, co, ir, hr) VALUES (?, ?, ?, ?, ?)")
        .bind("10.0.0.5")
        .bind("1,0,1,0")
        .bind("0,0,1,1")
        .bind("1,2,3,4,5,6,7,8")
        .bind("0,0,0,0,0,0,0,9")
        .execute(store.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let store = setup_test_store().await;
    seed_row(&store).await;

    let response = app(&store)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_unknown_or_malformed_token_is_unauthorized() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "s3cret").await.unwrap();
    seed_row(&store).await;

    for value in ["Token wrong", "Token s3cret2", "Bearer s3cret", "s3cret", "Token S3CRET"] {
        let (status, body) = get(app(&store), Some(value)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", value);
        assert_eq!(body["error"], "Unauthorized Access");
    }
}

#[tokio::test]
async fn test_valid_token_returns_cached_row() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "s3cret").await.unwrap();
    seed_row(&store).await;

    let (status, body) = get(app(&store), Some("Token s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "alice");
    assert_eq!(body["ip"], "10.0.0.5");
    assert_eq!(body["di"], "1,0,1,0");
    assert_eq!(body["co"], "0,0,1,1");
    assert_eq!(body["ir"], "1,2,3,4,5,6,7,8");
    assert_eq!(body["hr"], "0,0,0,0,0,0,0,9");
}

#[tokio::test]
async fn test_no_cached_row_is_not_found() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "s3cret").await.unwrap();

    let (status, body) = get(app(&store), Some("Token s3cret")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({"error": "No modbus data found"}));
}

#[tokio::test]
async fn test_partial_row_reports_blank_columns() {
    let store = setup_test_store().await;
    store.upsert_credential("alice", "s3cret").await.unwrap();
    sqlx::query("INSERT INTO modbus (ip, co) VALUES ('10.0.0.7', '1,1,1,1')")
        .execute(store.pool())
        .await
        .unwrap();

    let (status, body) = get(app(&store), Some("Token s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["co"], "1,1,1,1");
    assert!(body["di"].is_null());
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let store = setup_test_store().await;

    let response = app(&store)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "status-api");
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let store = setup_test_store().await;

    let response = app(&store)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    // Tables never created
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = StateStore::from_pool(pool);

    let (status, body) = get(app(&store), Some("Token s3cret")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

//! Status API - token-authenticated read-only view of the state store

use std::sync::Arc;

use block_store::StateStore;
use clap::Parser;
use errors::{GatewayError, GatewayResult};
use tracing::{error, info};

use status_api::bootstrap::{self, Args};
use status_api::{create_routes, AccessGateway, AppState};

#[tokio::main]
async fn main() -> GatewayResult<()> {
    let args = Args::parse();
    let config = bootstrap::resolve_config(&args)?;

    let service = bootstrap::service_info();
    bootstrap::initialize_logging(&args, &config, &service)?;
    common::service_bootstrap::print_startup_banner(&service);

    let store = StateStore::open(&config.db_path).await.map_err(|e| {
        error!("Cannot open state store {}: {}", config.db_path, e);
        GatewayError::from(e)
    })?;
    info!("State store: {}", config.db_path);

    let state = Arc::new(AppState::new(AccessGateway::new(store.clone())));
    let app = create_routes(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        GatewayError::ConnectionFailed {
            endpoint: addr.to_string(),
            reason: format!("bind failed: {}", e),
        }
    })?;
    info!("API server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await?;

    store.pool().close().await;
    info!("Status API stopped");
    Ok(())
}

//! Status API - read-only HTTP view of the state store
//!
//! `GET /` with `Authorization: Token <secret>` returns the cached block
//! snapshot of the current device. The live device is never contacted.

pub mod app_state;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;

pub use app_state::AppState;
pub use error::ApiError;
pub use gateway::{AccessGateway, Caller, StatusReport};
pub use routes::create_routes;

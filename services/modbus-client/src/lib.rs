//! Modbus block client
//!
//! Interactive front end over one Modbus TCP device session:
//!
//! ```text
//! ┌──────────┐   MenuCommand   ┌─────────┐   ModbusTransport   ┌────────┐
//! │ console  │───────────────▶ │ actions │ ──────────────────▶ │ device │
//! └──────────┘                 └─────────┘                     └────────┘
//!                                   │ sync (initial + per write)
//!                                   ▼
//!                              ┌──────────┐
//!                              │  store   │  (block-store, SQLite)
//!                              └──────────┘
//! ```

pub mod actions;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod console;
pub mod error;
pub mod menu;
pub mod session;
pub mod sync;
pub mod transport;

pub use error::{ClientError, Result};

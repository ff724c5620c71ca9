//! Block Store - SQLite persistence for the gateway
//!
//! Two tables, shared by the interactive client (writer) and the HTTP
//! facade (reader):
//!
//! ```text
//! modbus(ip TEXT PRIMARY KEY, di TEXT, co TEXT, ir TEXT, hr TEXT)
//! tokens(username TEXT PRIMARY KEY, password TEXT)
//! ```
//!
//! Every operation is a single statement, so each is atomic on its own.
//! Above that the store is last-write-wins.

mod credentials;
mod error;
mod schema;
mod snapshots;
mod store;

pub use error::{Result, StoreError};
pub use schema::{CREATE_MODBUS_TABLE, CREATE_TOKENS_TABLE};
pub use snapshots::StoredSnapshot;
pub use store::StateStore;

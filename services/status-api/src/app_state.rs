//! Shared application state

use chrono::{DateTime, Utc};

use crate::gateway::AccessGateway;

/// State shared by all handlers behind an `Arc`
pub struct AppState {
    pub gateway: AccessGateway,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: AccessGateway) -> Self {
        Self {
            gateway,
            started_at: Utc::now(),
        }
    }
}

//! Device session lifecycle
//!
//! `Init → Connecting → {Connected | Failed}`; `Connected → Closed` on exit
//! or on an unrecoverable transport failure. `Failed` and `Closed` are
//! terminal.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::transport::{Connector, Endpoint, ModbusTransport};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no connection attempted
    Init,
    /// Connection attempt in flight
    Connecting,
    /// Transport open
    Connected,
    /// Connect gave up
    Failed,
    /// Transport released
    Closed,
}

/// Initial connect policy
///
/// The default makes exactly one attempt.
#[derive(Debug, Clone, Default)]
pub struct ConnectPolicy {
    /// Extra attempts after the first failure
    pub retries: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl ConnectPolicy {
    pub fn from_config(retries: u32, backoff_ms: u64) -> Self {
        Self {
            retries,
            backoff: Duration::from_millis(backoff_ms),
        }
    }
}

/// The one device session a client process owns
pub struct Session<T> {
    endpoint: Endpoint,
    state: SessionState,
    transport: Option<T>,
}

impl<T: ModbusTransport> Session<T> {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: SessionState::Init,
            transport: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Open the transport, retrying per `policy`
    ///
    /// On failure the session ends in `Failed` and the last error is returned.
    pub async fn connect<C>(&mut self, connector: &C, policy: &ConnectPolicy) -> Result<()>
    where
        C: Connector<Transport = T>,
    {
        if self.state != SessionState::Init {
            return Err(ClientError::protocol(
                "connect",
                format!("session already {:?}", self.state),
            ));
        }
        self.state = SessionState::Connecting;

        let attempts = policy.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match connector.connect(&self.endpoint).await {
                Ok(transport) => {
                    self.transport = Some(transport);
                    self.state = SessionState::Connected;
                    info!("Session open to {}", self.endpoint);
                    return Ok(());
                },
                Err(e) if attempt < attempts => {
                    warn!(
                        "Connect attempt {}/{} to {} failed: {}",
                        attempt, attempts, self.endpoint, e
                    );
                    attempt += 1;
                    tokio::time::sleep(policy.backoff).await;
                },
                Err(e) => {
                    warn!("Giving up on {}: {}", self.endpoint, e);
                    self.state = SessionState::Failed;
                    return Err(e);
                },
            }
        }
    }

    /// The open transport
    pub fn transport(&mut self) -> Result<&mut T> {
        match self.state {
            SessionState::Connected => self.transport.as_mut().ok_or(ClientError::NotConnected),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Release the transport; idempotent
    pub async fn close(&mut self) -> Result<()> {
        let result = match self.transport.take() {
            Some(mut transport) => transport.close().await,
            None => Ok(()),
        };
        if self.state == SessionState::Connected {
            self.state = SessionState::Closed;
            info!("Session to {} closed", self.endpoint);
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::transport::{MemoryConnector, MemoryDevice, MemoryTransport};

    fn endpoint() -> Endpoint {
        Endpoint::new("10.0.0.5", 502)
    }

    #[tokio::test]
    async fn test_connect_then_close() {
        let connector = MemoryConnector::default();
        let mut session: Session<MemoryTransport> = Session::new(endpoint());
        assert_eq!(session.state(), SessionState::Init);
        assert!(session.transport().is_err());

        session
            .connect(&connector, &ConnectPolicy::default())
            .await
            .unwrap();
        assert!(session.is_open());
        assert!(session.transport().is_ok());

        session.close().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.transport(),
            Err(ClientError::NotConnected)
        ));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_connect_is_terminal() {
        let device = MemoryDevice::new();
        device.refuse_connections(5);
        let connector = MemoryConnector::new(device.clone());
        let mut session = Session::new(endpoint());

        let err = session
            .connect(&connector, &ConnectPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(device.connect_count(), 1);

        // No second chance from Failed
        assert!(session
            .connect(&connector, &ConnectPolicy::default())
            .await
            .is_err());
        assert_eq!(device.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_connected() {
        let device = MemoryDevice::new();
        device.refuse_connections(2);
        let connector = MemoryConnector::new(device.clone());
        let mut session = Session::new(endpoint());

        session
            .connect(&connector, &ConnectPolicy::from_config(3, 500))
            .await
            .unwrap();
        assert!(session.is_open());
        assert_eq!(device.connect_count(), 3);
    }
}

//! Modbus TCP transport over tokio-modbus

use std::borrow::Cow;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use block_model::{BlockKind, BlockValues};
use tokio_modbus::client::{tcp, Client, Context, Reader, Writer};
use tokio_modbus::{ExceptionCode, Request, Response, Slave};
use tracing::{debug, info, warn};

use super::identity::{parse_device_identity, DeviceIdentity, BASIC_REQUEST, FUNCTION_CODE};
use super::{ensure_writable, Connector, Endpoint, ModbusTransport};
use crate::error::{ClientError, Result};

/// Opens tokio-modbus TCP contexts
#[derive(Debug, Clone)]
pub struct TcpConnector {
    pub unit_id: u8,
    pub timeout: Duration,
}

impl TcpConnector {
    pub fn new(unit_id: u8, timeout: Duration) -> Self {
        Self { unit_id, timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Transport = TcpTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<TcpTransport> {
        let connection_error = |reason: String| ClientError::Connection {
            endpoint: endpoint.to_string(),
            reason,
        };

        let addr = resolve(endpoint).await.map_err(|e| connection_error(e.to_string()))?;

        let ctx = tokio::time::timeout(self.timeout, tcp::connect_slave(addr, Slave(self.unit_id)))
            .await
            .map_err(|_| connection_error(format!("no answer within {:?}", self.timeout)))?
            .map_err(|e| connection_error(e.to_string()))?;

        info!("Connected to {} (unit {})", addr, self.unit_id);
        Ok(TcpTransport {
            ctx: Some(ctx),
            endpoint: endpoint.to_string(),
            timeout: self.timeout,
        })
    }
}

async fn resolve(endpoint: &Endpoint) -> io::Result<SocketAddr> {
    tokio::net::lookup_host((endpoint.host.as_str(), endpoint.port))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host did not resolve"))
}

/// One open tokio-modbus context
pub struct TcpTransport {
    ctx: Option<Context>,
    endpoint: String,
    timeout: Duration,
}

impl TcpTransport {
    /// Split borrows: the live context plus what error mapping needs
    fn parts(&mut self) -> Result<(&mut Context, CallScope<'_>)> {
        let Self {
            ctx,
            endpoint,
            timeout,
        } = self;
        let ctx = ctx.as_mut().ok_or(ClientError::NotConnected)?;
        Ok((
            ctx,
            CallScope {
                endpoint,
                timeout: *timeout,
            },
        ))
    }
}

struct CallScope<'a> {
    endpoint: &'a str,
    timeout: Duration,
}

impl CallScope<'_> {
    /// Apply the request timeout and flatten tokio-modbus' nested result
    async fn call<T, F>(&self, operation: &str, request: F) -> Result<T>
    where
        F: Future<Output = tokio_modbus::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Err(ClientError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(exception))) => Err(exception_error(operation, exception)),
            Ok(Err(tokio_modbus::Error::Transport(e))) if link_lost(&e) => {
                Err(ClientError::Connection {
                    endpoint: self.endpoint.to_string(),
                    reason: format!("{}: {}", operation, e),
                })
            },
            Ok(Err(e)) => Err(ClientError::protocol(operation, e.to_string())),
        }
    }
}

fn exception_error(operation: &str, exception: ExceptionCode) -> ClientError {
    ClientError::protocol(operation, format!("device exception {:?}", exception))
}

fn link_lost(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    )
}

#[async_trait]
impl ModbusTransport for TcpTransport {
    async fn read_block(&mut self, kind: BlockKind, base: u16, count: u16) -> Result<BlockValues> {
        let operation = format!("read {}", kind.label());
        debug!("{} at {} x{}", operation, base, count);

        let (ctx, scope) = self.parts()?;

        let values = match kind {
            BlockKind::DiscreteInputs => BlockValues::Bits(
                scope
                    .call(&operation, ctx.read_discrete_inputs(base, count))
                    .await?,
            ),
            BlockKind::Coils => {
                BlockValues::Bits(scope.call(&operation, ctx.read_coils(base, count)).await?)
            },
            BlockKind::InputRegisters => BlockValues::Registers(
                scope
                    .call(&operation, ctx.read_input_registers(base, count))
                    .await?,
            ),
            BlockKind::HoldingRegisters => BlockValues::Registers(
                scope
                    .call(&operation, ctx.read_holding_registers(base, count))
                    .await?,
            ),
        };

        // Bit reads come back padded to whole bytes
        Ok(match values {
            BlockValues::Bits(mut bits) => {
                bits.truncate(usize::from(count));
                BlockValues::Bits(bits)
            },
            registers => registers,
        })
    }

    async fn write_block(
        &mut self,
        kind: BlockKind,
        base: u16,
        values: &BlockValues,
    ) -> Result<()> {
        ensure_writable(kind, values)?;
        let operation = format!("write {}", kind.label());
        debug!("{} at {}: {}", operation, base, values.encode());

        let (ctx, scope) = self.parts()?;

        match values {
            BlockValues::Bits(bits) => {
                scope
                    .call(&operation, ctx.write_multiple_coils(base, bits))
                    .await
            },
            BlockValues::Registers(registers) => {
                scope
                    .call(&operation, ctx.write_multiple_registers(base, registers))
                    .await
            },
        }
    }

    async fn read_identity(&mut self) -> Result<DeviceIdentity> {
        let operation = "read device identification";

        let (ctx, scope) = self.parts()?;

        let request = Request::Custom(FUNCTION_CODE, Cow::Owned(BASIC_REQUEST.to_vec()));
        match scope.call(operation, ctx.call(request)).await? {
            Response::Custom(FUNCTION_CODE, body) => parse_device_identity(&body),
            other => Err(ClientError::protocol(
                operation,
                format!("unexpected response {:?}", other),
            )),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut ctx) = self.ctx.take() {
            if let Err(e) = ctx.disconnect().await {
                warn!("Disconnect from {}: {}", self.endpoint, e);
            }
            info!("Disconnected from {}", self.endpoint);
        }
        Ok(())
    }
}

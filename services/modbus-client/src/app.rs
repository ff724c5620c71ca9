//! Interactive run loop
//!
//! Owns the device session for the life of the process and closes it on
//! exit, end of input, or an unrecoverable transport failure.

use std::io::Write;

use block_store::{StateStore, StoreError};
use tracing::{error, info, warn};

use crate::actions;
use crate::console::{Console, Prompt};
use crate::error::{ClientError, Result};
use crate::menu::MenuCommand;
use crate::session::Session;
use crate::sync::initial_sync;
use crate::transport::ModbusTransport;

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct InteractiveClient<T, P, W> {
    session: Session<T>,
    store: StateStore,
    console: Console<P, W>,
    ip: String,
}

impl<T, P, W> InteractiveClient<T, P, W>
where
    T: ModbusTransport,
    P: Prompt,
    W: Write,
{
    /// `session` must already be connected
    pub fn new(session: Session<T>, store: StateStore, console: Console<P, W>) -> Self {
        let ip = session.endpoint().ip().to_string();
        Self {
            session,
            store,
            console,
            ip,
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn into_console(self) -> Console<P, W> {
        self.console
    }

    /// Initial sync, then device identity
    ///
    /// A failed sync is a warning. A failed identity read closes the session
    /// and is returned.
    pub async fn startup(&mut self) -> Result<()> {
        match self.sync_and_identify().await {
            Ok(()) => Ok(()),
            Err(e) => self.abort(e).await,
        }
    }

    async fn sync_and_identify(&mut self) -> Result<()> {
        let transport = self.session.transport()?;
        match initial_sync(transport, &self.store, &self.ip).await {
            Ok(_) => {}
            Err(ClientError::Storage(e)) => {
                self.console
                    .warning(format!("Warning: initial device state not cached: {}", e))?;
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => {
                self.console
                    .warning("Warning: One or more Modbus blocks failed during initial sync.")?;
            },
        }

        let transport = self.session.transport()?;
        match transport.read_identity().await {
            Ok(identity) => {
                info!(
                    "Device {} {} rev {}",
                    identity.vendor, identity.product, identity.revision
                );
                self.console.identity(&identity)
            },
            Err(e) => {
                self.console.error("Unable to read Modbus device info.")?;
                Err(e)
            },
        }
    }

    /// Menu loop until exit, end of input or a fatal error
    ///
    /// The session is closed on every way out.
    pub async fn run(&mut self) -> Result<()> {
        if let Err(e) = self.menu_loop().await {
            return self.abort(e).await;
        }

        if let Err(e) = self.console.line("\nTerminating client....") {
            warn!("Console unavailable at exit: {}", e);
        }
        self.session.close().await
    }

    async fn menu_loop(&mut self) -> Result<()> {
        loop {
            self.console.menu()?;
            let Some(choice) = self.console.read_line("Select an activity: ")? else {
                return Ok(());
            };

            let flow = match MenuCommand::parse(&choice) {
                Some(command) => self.dispatch(command).await?,
                None => {
                    self.console.line("Not a valid choice, try again\n")?;
                    Flow::Continue
                },
            };

            if flow == Flow::Exit {
                return Ok(());
            }
            if self.console.read_line("Main menu, press Enter: ")?.is_none() {
                return Ok(());
            }
        }
    }

    /// Run one command; only unrecoverable errors come back as `Err`
    pub async fn dispatch(&mut self, command: MenuCommand) -> Result<Flow> {
        match command {
            MenuCommand::Read(kind) => {
                let transport = self.session.transport()?;
                match actions::read_block(transport, kind).await {
                    Ok(values) => self.console.block(kind, &values)?,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => self.console.read_failed(kind, &e)?,
                }
            },
            MenuCommand::ReadAll => {
                let transport = self.session.transport()?;
                let results = actions::read_all(transport).await;
                self.console.overview(&results)?;
                if let Some(e) = results
                    .into_iter()
                    .find_map(|(_, result)| result.err().filter(ClientError::is_fatal))
                {
                    return Err(e);
                }
            },
            MenuCommand::Write(kind) => {
                self.console.write_instructions(kind)?;
                let prompt = format!(
                    "list of up to {} {} values: ",
                    kind.width(),
                    if kind.is_bit() { "bool" } else { "integer" }
                );
                let Some(line) = self.console.read_line(&prompt)? else {
                    return Ok(Flow::Exit);
                };
                let pending = match actions::prepare_write(kind, &line) {
                    Ok(pending) => pending,
                    Err(e) => {
                        self.console.write_rejected(kind, &e)?;
                        return Ok(Flow::Continue);
                    },
                };
                self.console.accepting(&pending)?;

                let transport = self.session.transport()?;
                match actions::execute_write(transport, &self.store, &self.ip, pending).await {
                    Ok(outcome) => {
                        self.console.write_succeeded(&outcome)?;
                        if let Err(e) = outcome.readback {
                            if e.is_fatal() {
                                return Err(e);
                            }
                        }
                    },
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => self.console.write_failed(kind, &e)?,
                }
            },
            MenuCommand::CreateUser => {
                self.console.line("Create or Update User Account")?;
                let Some(username) = self.console.read_line("Enter a username: ")? else {
                    return Ok(Flow::Exit);
                };
                let Some(password) = self.console.read_secret("Enter a password: ")? else {
                    return Ok(Flow::Exit);
                };
                match actions::create_user(&self.store, &username, &password).await {
                    Ok(username) => self.console.line(format!(
                        "User '{}' and the associated password added.",
                        username
                    ))?,
                    Err(ClientError::Storage(StoreError::Validation(msg))) => {
                        self.console.error(msg)?
                    },
                    Err(e) => {
                        warn!("Credential not stored: {}", e);
                        self.console.error(format!("Database error: {}", e))?
                    },
                }
            },
            MenuCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Report a fatal error, close the session and hand the error back
    async fn abort(&mut self, err: ClientError) -> Result<()> {
        error!("Session to {} ended: {}", self.ip, err);
        if let Err(e) = self.console.error(format!("Error: {}", err)) {
            warn!("Console unavailable: {}", e);
        }
        if let Err(e) = self.session.close().await {
            warn!("Close after failure: {}", e);
        }
        Err(err)
    }
}

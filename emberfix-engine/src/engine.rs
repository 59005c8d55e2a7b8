/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Connect-and-run driver.
//!
//! An [`Engine`] owns one session configuration and an [`Application`]. Each
//! call to [`Engine::run`] opens a fresh connection, logs on and pumps the
//! session until it ends. Reconnecting is left to the caller: calling `run`
//! again starts over from the configured sequence numbers.

use crate::application::Application;
use emberfix_core::error::FixError;
use emberfix_session::{Clock, Event, Session, SessionConfig, SessionId, SystemClock};
use emberfix_transport::{TcpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A FIX engine driving one session.
#[derive(Debug)]
pub struct Engine<A> {
    config: SessionConfig,
    id: SessionId,
    application: Arc<A>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl<A: Application> Engine<A> {
    pub(crate) fn new(
        config: SessionConfig,
        application: Arc<A>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            id: config.session_id(),
            config,
            application,
            connect_timeout,
            read_timeout,
        }
    }

    /// Returns the identity of the session this engine drives.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Connects to the configured `host:port` and runs the session on the
    /// wall clock.
    ///
    /// # Returns
    /// The error that ended the session. A failed connection attempt is
    /// reported the same way.
    pub fn run(&self) -> FixError {
        let address = self.config.address();
        info!(session = %self.id, %address, "connecting");
        match TcpTransport::connect(address.as_str(), self.connect_timeout, self.read_timeout) {
            Ok(transport) => self.run_with(transport, SystemClock),
            Err(err) => self.terminate(err.into()),
        }
    }

    /// Runs the session over an already connected transport.
    ///
    /// # Arguments
    /// * `transport` - Byte stream to the counterparty
    /// * `clock` - Time source for the session
    ///
    /// # Returns
    /// The error that ended the session.
    pub fn run_with<T: Transport, C: Clock>(&self, transport: T, clock: C) -> FixError {
        let mut session = Session::new(self.config.clone(), transport, clock);
        let err = session.run_events(|event| match event {
            Event::Established => self.application.on_logon(&self.id),
            Event::Message(message) => self.application.from_app(message, &self.id),
        });
        self.terminate(err)
    }

    fn terminate(&self, err: FixError) -> FixError {
        self.application.on_terminate(&err, &self.id);
        err
    }
}

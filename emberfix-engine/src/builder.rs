/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine builder for fluent configuration.

use crate::application::{Application, NoOpApplication};
use crate::engine::Engine;
use emberfix_session::SessionConfig;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound for one transport read, and so the longest time
/// between two evaluations of the heartbeat timers.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Builder for configuring a FIX engine.
#[derive(Debug)]
pub struct EngineBuilder<A: Application = NoOpApplication> {
    /// Application callback handler.
    application: Arc<A>,
    /// Session configuration.
    config: SessionConfig,
    /// Connection timeout.
    connect_timeout: Duration,
    /// Read timeout of the TCP transport.
    read_timeout: Duration,
}

impl EngineBuilder<NoOpApplication> {
    /// Creates a new engine builder with default settings.
    ///
    /// # Arguments
    /// * `config` - Configuration of the session the engine drives
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            application: Arc::new(NoOpApplication),
            config,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl<A: Application> EngineBuilder<A> {
    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B: Application>(self, application: B) -> EngineBuilder<B> {
        self.with_shared_application(Arc::new(application))
    }

    /// Sets an application callback handler the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_application<B: Application>(self, application: Arc<B>) -> EngineBuilder<B> {
        EngineBuilder {
            application,
            config: self.config,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout. Zero blocks until bytes arrive, which stops the
    /// heartbeat timers from running on a quiet connection.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the read timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns the application handler.
    #[must_use]
    pub fn application(&self) -> Arc<A> {
        Arc::clone(&self.application)
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine<A> {
        Engine::new(
            self.config,
            self.application,
            self.connect_timeout,
            self.read_timeout,
        )
    }
}

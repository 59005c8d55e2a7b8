/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides:
//! - [`SessionConfig`]: Immutable settings a session is created with
//! - [`SessionConfigBuilder`]: Validating builder for [`SessionConfig`]
//! - [`Role`]: Which side of the logon handshake a session plays
//! - [`SessionId`]: Identity of a session, used in log records

use emberfix_core::error::SessionError;
use emberfix_core::types::{CompId, SeqNum};
use std::fmt;
use std::time::Duration;

/// Default FIX version.
pub const DEFAULT_BEGIN_STRING: &str = "FIX.4.2";

/// Default heartbeat interval.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Default time allowed for the logon handshake.
pub const DEFAULT_LOGON_TIMEOUT: Duration = Duration::from_secs(10);

/// Default largest inbound frame, in bytes.
pub const DEFAULT_INBOUND_BUFFER_SIZE: usize = 65536;

/// Default initial capacity of the outbound writer, in bytes.
pub const DEFAULT_OUTBOUND_BUFFER_SIZE: usize = 1024;

/// Side of the logon handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Connects and sends the first Logon.
    #[default]
    Initiator,
    /// Waits for the counterparty's Logon and answers it.
    Acceptor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "initiator"),
            Self::Acceptor => write!(f, "acceptor"),
        }
    }
}

/// Configuration for a FIX session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// FIX version BeginString (e.g., "FIX.4.2").
    pub begin_string: String,
    /// Side of the logon handshake.
    pub role: Role,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// Heartbeat interval, whole seconds. Zero disables heartbeats and the
    /// inbound liveness timeout.
    pub heartbeat_interval: Duration,
    /// First inbound sequence number expected.
    pub inbound_seq_num: SeqNum,
    /// First outbound sequence number sent.
    pub outbound_seq_num: SeqNum,
    /// Counterparty host.
    pub host: String,
    /// Counterparty port.
    pub port: u16,
    /// Largest inbound frame, in bytes.
    pub inbound_buffer_size: usize,
    /// Initial capacity of the outbound writer, in bytes.
    pub outbound_buffer_size: usize,
    /// Time allowed between starting the logon and receiving a valid Logon.
    pub logon_timeout: Duration,
}

impl SessionConfig {
    /// Creates a new session configuration with required fields.
    ///
    /// # Arguments
    /// * `sender_comp_id` - The sender CompID
    /// * `target_comp_id` - The target CompID
    /// * `begin_string` - The FIX version string
    #[must_use]
    pub fn new(
        sender_comp_id: CompId,
        target_comp_id: CompId,
        begin_string: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            role: Role::Initiator,
            sender_comp_id,
            target_comp_id,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            inbound_seq_num: SeqNum::default(),
            outbound_seq_num: SeqNum::default(),
            host: String::from("localhost"),
            port: 0,
            inbound_buffer_size: DEFAULT_INBOUND_BUFFER_SIZE,
            outbound_buffer_size: DEFAULT_OUTBOUND_BUFFER_SIZE,
            logon_timeout: DEFAULT_LOGON_TIMEOUT,
        }
    }

    /// Returns the heartbeat interval in seconds, as sent in tag 108.
    #[inline]
    #[must_use]
    pub const fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Returns the `host:port` address of the counterparty.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the identity of the session this configuration describes.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        SessionId {
            begin_string: self.begin_string.clone(),
            sender_comp_id: self.sender_comp_id,
            target_comp_id: self.target_comp_id,
        }
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    begin_string: Option<String>,
    role: Role,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    heartbeat_interval: Option<Duration>,
    inbound_seq_num: Option<u64>,
    outbound_seq_num: Option<u64>,
    host: Option<String>,
    port: Option<u16>,
    inbound_buffer_size: Option<usize>,
    outbound_buffer_size: Option<usize>,
    logon_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the FIX version.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the handshake role.
    #[must_use]
    pub const fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the first inbound sequence number expected.
    #[must_use]
    pub const fn inbound_seq_num(mut self, seq: u64) -> Self {
        self.inbound_seq_num = Some(seq);
        self
    }

    /// Sets the first outbound sequence number sent.
    #[must_use]
    pub const fn outbound_seq_num(mut self, seq: u64) -> Self {
        self.outbound_seq_num = Some(seq);
        self
    }

    /// Sets the counterparty host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the counterparty port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the largest inbound frame accepted.
    #[must_use]
    pub const fn inbound_buffer_size(mut self, size: usize) -> Self {
        self.inbound_buffer_size = Some(size);
        self
    }

    /// Sets the initial capacity of the outbound writer.
    #[must_use]
    pub const fn outbound_buffer_size(mut self, size: usize) -> Self {
        self.outbound_buffer_size = Some(size);
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub const fn logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if a CompID is missing, empty or
    /// longer than 32 bytes, the BeginString is empty, the heartbeat interval
    /// is not a whole number of seconds, a sequence number is zero, or a
    /// buffer size is zero.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let sender = comp_id("sender_comp_id", self.sender_comp_id)?;
        let target = comp_id("target_comp_id", self.target_comp_id)?;

        let begin_string = self
            .begin_string
            .unwrap_or_else(|| DEFAULT_BEGIN_STRING.to_string());
        if begin_string.is_empty() || begin_string.contains('\x01') {
            return Err(SessionError::Configuration(format!(
                "invalid begin_string {begin_string:?}"
            )));
        }

        let mut config = SessionConfig::new(sender, target, begin_string);
        config.role = self.role;

        if let Some(interval) = self.heartbeat_interval {
            if interval.subsec_nanos() != 0 {
                return Err(SessionError::Configuration(format!(
                    "heartbeat_interval must be whole seconds, got {interval:?}"
                )));
            }
            config.heartbeat_interval = interval;
        }

        config.inbound_seq_num = seq_num("inbound_seq_num", self.inbound_seq_num)?;
        config.outbound_seq_num = seq_num("outbound_seq_num", self.outbound_seq_num)?;

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        config.inbound_buffer_size =
            buffer_size("inbound_buffer_size", self.inbound_buffer_size, DEFAULT_INBOUND_BUFFER_SIZE)?;
        config.outbound_buffer_size = buffer_size(
            "outbound_buffer_size",
            self.outbound_buffer_size,
            DEFAULT_OUTBOUND_BUFFER_SIZE,
        )?;

        if let Some(timeout) = self.logon_timeout {
            config.logon_timeout = timeout;
        }

        Ok(config)
    }
}

fn comp_id(name: &str, value: Option<String>) -> Result<CompId, SessionError> {
    let value = value.ok_or_else(|| SessionError::Configuration(format!("{name} is required")))?;
    match CompId::new(&value) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SessionError::Configuration(format!(
            "{name} must be 1 to 32 bytes, got {value:?}"
        ))),
    }
}

fn seq_num(name: &str, value: Option<u64>) -> Result<SeqNum, SessionError> {
    let seq = value.map_or_else(SeqNum::default, SeqNum::new);
    if seq.is_valid() {
        Ok(seq)
    } else {
        Err(SessionError::Configuration(format!("{name} must be at least 1")))
    }
}

fn buffer_size(name: &str, value: Option<usize>, default: usize) -> Result<usize, SessionError> {
    match value {
        Some(0) => Err(SessionError::Configuration(format!("{name} must be non-zero"))),
        Some(size) => Ok(size),
        None => Ok(default),
    }
}

/// Identity of a FIX session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// FIX version.
    pub begin_string: String,
    /// Our CompID.
    pub sender_comp_id: CompId,
    /// The counterparty's CompID.
    pub target_comp_id: CompId,
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_new() {
        let sender = CompId::new("SENDER").unwrap();
        let target = CompId::new("TARGET").unwrap();
        let config = SessionConfig::new(sender, target, "FIX.4.2");

        assert_eq!(config.sender_comp_id.as_str(), "SENDER");
        assert_eq!(config.target_comp_id.as_str(), "TARGET");
        assert_eq!(config.begin_string, "FIX.4.2");
        assert_eq!(config.role, Role::Initiator);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.inbound_seq_num, SeqNum::new(1));
        assert_eq!(config.outbound_seq_num, SeqNum::new(1));
        assert_eq!(config.logon_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfigBuilder::new()
            .sender_comp_id("Client")
            .target_comp_id("Server")
            .begin_string("FIX.4.2")
            .role(Role::Acceptor)
            .heartbeat_interval(Duration::from_secs(5))
            .inbound_seq_num(10)
            .outbound_seq_num(20)
            .host("127.0.0.1")
            .port(1234)
            .inbound_buffer_size(4096)
            .build()
            .unwrap();

        assert_eq!(config.role, Role::Acceptor);
        assert_eq!(config.heartbeat_interval_secs(), 5);
        assert_eq!(config.inbound_seq_num.value(), 10);
        assert_eq!(config.outbound_seq_num.value(), 20);
        assert_eq!(config.address(), "127.0.0.1:1234");
        assert_eq!(config.inbound_buffer_size, 4096);
        assert_eq!(config.outbound_buffer_size, DEFAULT_OUTBOUND_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_comp_ids() {
        let err = SessionConfigBuilder::new()
            .target_comp_id("Server")
            .build()
            .unwrap_err();
        assert!(matches!(err, SessionError::Configuration(msg) if msg.contains("sender_comp_id")));

        assert!(
            SessionConfigBuilder::new()
                .sender_comp_id("")
                .target_comp_id("Server")
                .build()
                .is_err()
        );
        assert!(
            SessionConfigBuilder::new()
                .sender_comp_id("X".repeat(33))
                .target_comp_id("Server")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        let base = || {
            SessionConfigBuilder::new()
                .sender_comp_id("Client")
                .target_comp_id("Server")
        };
        assert!(base().heartbeat_interval(Duration::from_millis(1500)).build().is_err());
        assert!(base().inbound_seq_num(0).build().is_err());
        assert!(base().outbound_seq_num(0).build().is_err());
        assert!(base().inbound_buffer_size(0).build().is_err());
        assert!(base().begin_string("").build().is_err());
        assert!(base().heartbeat_interval(Duration::ZERO).build().is_ok());
    }

    #[test]
    fn test_session_id_display() {
        let config = SessionConfigBuilder::new()
            .sender_comp_id("SENDER")
            .target_comp_id("TARGET")
            .build()
            .unwrap();
        assert_eq!(config.session_id().to_string(), "FIX.4.2:SENDER->TARGET");
    }
}

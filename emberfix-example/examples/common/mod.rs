//! Common utilities shared across examples.

#![allow(dead_code)]

use emberfix_session::{Role, SessionConfig, SessionConfigBuilder};
use std::env;
use std::time::Duration;

/// Default counterparty port.
pub const DEFAULT_PORT: u16 = 9876;

/// Default counterparty host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// FIX version spoken by the examples.
pub const FIX_VERSION: &str = "FIX.4.2";

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval: u64,
}

impl ExampleConfig {
    /// Creates a new configuration for the initiator.
    #[must_use]
    pub fn client() -> Self {
        Self::from_env("CLIENT", "SERVER")
    }

    /// Creates a new configuration for the counterparty.
    #[must_use]
    pub fn server() -> Self {
        Self::from_env("SERVER", "CLIENT")
    }

    fn from_env(sender: &str, target: &str) -> Self {
        Self {
            host: env::var("FIX_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("FIX_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sender_comp_id: env::var("FIX_SENDER").unwrap_or_else(|_| sender.to_string()),
            target_comp_id: env::var("FIX_TARGET").unwrap_or_else(|_| target.to_string()),
            heartbeat_interval: env::var("FIX_HEARTBEAT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds a validated session configuration.
    pub fn session_config(&self, role: Role) -> anyhow::Result<SessionConfig> {
        let config = SessionConfigBuilder::new()
            .begin_string(FIX_VERSION)
            .role(role)
            .sender_comp_id(self.sender_comp_id.as_str())
            .target_comp_id(self.target_comp_id.as_str())
            .heartbeat_interval(Duration::from_secs(self.heartbeat_interval))
            .host(self.host.as_str())
            .port(self.port)
            .build()?;
        Ok(config)
    }
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

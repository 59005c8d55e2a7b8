/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix
//!
//! A FIX session layer engine for Rust.
//!
//! EmberFix implements the application-independent part of the FIX protocol:
//! the logon handshake, sequence number checks, heartbeats, test requests and
//! gap fill recovery. Business messages are handed to the caller untouched.
//!
//! ## Features
//!
//! - **Zero-copy parsing**: Field values reference the received frame
//! - **Allocation-free sending**: One reusable writer per session
//! - **Deterministic timing**: Every timer reads an injected clock
//! - **Pluggable transport**: TCP, in-memory, or any `Transport`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emberfix::prelude::*;
//! use std::time::Duration;
//!
//! struct Printer;
//!
//! impl Application for Printer {
//!     fn from_app(&self, message: &Message, _session_id: &SessionId) {
//!         println!("{message}");
//!     }
//! }
//!
//! # fn main() -> std::result::Result<(), SessionError> {
//! let config = SessionConfigBuilder::new()
//!     .sender_comp_id("CLIENT")
//!     .target_comp_id("SERVER")
//!     .heartbeat_interval(Duration::from_secs(30))
//!     .host("127.0.0.1")
//!     .port(9878)
//!     .build()?;
//!
//! let engine = EngineBuilder::new(config).with_application(Printer).build();
//! let err = engine.run();
//! eprintln!("session ended: {err}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Error types, primitive types and field access
//! - [`tagvalue`]: Tag=value parsing and message writing
//! - [`session`]: Session layer state machine
//! - [`transport`]: Byte transports and stream framing
//! - [`engine`]: Application callbacks and the connect-and-run driver

pub mod core {
    //! Error types, primitive types and field access.
    pub use emberfix_core::*;
}

pub mod tagvalue {
    //! Tag=value parsing and message writing.
    pub use emberfix_tagvalue::*;
}

pub mod session {
    //! Session layer state machine.
    pub use emberfix_session::*;
}

pub mod transport {
    //! Byte transports and stream framing.
    pub use emberfix_transport::*;
}

pub mod engine {
    //! Application callbacks and the connect-and-run driver.
    pub use emberfix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use emberfix_core::{
        CompId, DecodeError, Field, FixError, MsgType, Result, SeqNum, SessionError, Timestamp,
    };

    // Tag-value encoding
    pub use emberfix_tagvalue::{Message, MessageWriter, calculate_checksum};

    // Session
    pub use emberfix_session::{
        Clock, ManualClock, Phase, Role, Session, SessionConfig, SessionConfigBuilder, SessionId,
        SystemClock,
    };

    // Transport
    pub use emberfix_transport::{MemoryTransport, TcpTransport, Transport};

    // Engine
    pub use emberfix_engine::{Application, Engine, EngineBuilder};
}

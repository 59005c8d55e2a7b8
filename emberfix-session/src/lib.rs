/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix Session
//!
//! FIX session layer protocol implementation for the EmberFix engine.
//!
//! This crate provides:
//! - **State machine**: Logon handshake, inbound validation and administrative
//!   message handling, drivable one cycle at a time or to completion
//! - **Sequence management**: In-order, gap and too-low classification
//! - **Heartbeat handling**: Heartbeat, TestRequest and liveness timeout timing
//! - **Recovery**: ResendRequest and SequenceReset-GapFill processing
//! - **Clock**: Injectable time source, with a manual clock for tests
//! - **Configuration**: Validated session configuration

pub mod clock;
pub mod config;
pub mod heartbeat;
pub mod sequence;
pub mod session;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Role, SessionConfig, SessionConfigBuilder, SessionId};
pub use heartbeat::{HeartbeatTimer, Liveness};
pub use sequence::{Advance, SequenceCheck};
pub use session::{Event, Session};
pub use state::{Phase, State};

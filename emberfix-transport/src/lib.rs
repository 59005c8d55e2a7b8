/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix Transport
//!
//! Byte-stream transports and message framing for EmberFix sessions.
//!
//! This crate provides:
//! - **Transport**: the blocking byte-stream trait sessions are written against
//! - **TCP transport**: `std::net` socket with read timeout and `TCP_NODELAY`
//! - **Memory transport**: queue-backed pair for tests and simulations
//! - **Codec**: FIX frame splitting, usable under a `tokio_util` `Framed`
//! - **Channel**: one parsed message per read, with resync on garbage

pub mod channel;
pub mod codec;
pub mod memory;
pub mod tcp;
pub mod transport;

pub use channel::Channel;
pub use codec::{CodecError, FixCodec};
pub use memory::{MemoryHandle, MemoryTransport};
pub use tcp::TcpTransport;
pub use transport::Transport;

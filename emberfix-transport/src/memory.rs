/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory transport.
//!
//! [`MemoryTransport`] is the session's end of a pair of byte queues and
//! [`MemoryHandle`] is the counterparty's end. Tests and simulations feed
//! inbound bytes and inspect outbound frames through the handle without a
//! socket.

use crate::transport::Transport;
use bytes::{Buf, Bytes, BytesMut};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Queues {
    /// Bytes waiting to be read by the session.
    inbound: BytesMut,
    /// Writes made by the session, one entry per `write_all`.
    outbound: VecDeque<Bytes>,
    closed: bool,
}

/// Session side of an in-memory byte stream.
///
/// Reads never block: with nothing queued they return `Ok(0)`, as a socket
/// read timeout would.
#[derive(Debug)]
pub struct MemoryTransport {
    queues: Arc<Mutex<Queues>>,
}

/// Counterparty side of a [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    queues: Arc<Mutex<Queues>>,
}

impl MemoryTransport {
    /// Creates a connected transport and handle.
    #[must_use]
    pub fn pair() -> (Self, MemoryHandle) {
        let queues = Arc::new(Mutex::new(Queues::default()));
        (
            Self {
                queues: Arc::clone(&queues),
            },
            MemoryHandle { queues },
        )
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut queues = self.queues.lock();
        if queues.inbound.is_empty() && queues.closed {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "memory transport closed",
            ));
        }

        let n = buf.len().min(queues.inbound.len());
        buf[..n].copy_from_slice(&queues.inbound[..n]);
        queues.inbound.advance(n);
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut queues = self.queues.lock();
        if queues.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "memory transport closed",
            ));
        }
        queues.outbound.push_back(Bytes::copy_from_slice(bytes));
        Ok(())
    }
}

impl MemoryHandle {
    /// Queues bytes for the session to read.
    pub fn push_inbound(&self, bytes: impl AsRef<[u8]>) {
        self.queues.lock().inbound.extend_from_slice(bytes.as_ref());
    }

    /// Takes the oldest write made by the session.
    #[must_use]
    pub fn pop_outbound(&self) -> Option<Bytes> {
        self.queues.lock().outbound.pop_front()
    }

    /// Returns the number of writes not yet taken.
    #[must_use]
    pub fn outbound_len(&self) -> usize {
        self.queues.lock().outbound.len()
    }

    /// Returns the number of queued bytes the session has not read yet.
    #[must_use]
    pub fn inbound_len(&self) -> usize {
        self.queues.lock().inbound.len()
    }

    /// Closes the stream. Once drained, session reads fail with `UnexpectedEof`.
    pub fn close(&self) {
        self.queues.lock().closed = true;
    }
}

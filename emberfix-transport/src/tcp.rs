/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Blocking TCP transport.

use crate::transport::{Transport, timeout_as_empty};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// TCP transport over a blocking `std::net::TcpStream`.
///
/// Nagle's algorithm is disabled. Reads block for at most the configured read
/// timeout so the session can run its timers between reads.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Connects to `addr`, trying each resolved address in turn.
    ///
    /// # Arguments
    /// * `addr` - Host and port of the counterparty
    /// * `connect_timeout` - Upper bound for each connection attempt
    /// * `read_timeout` - Upper bound for each read; zero blocks indefinitely
    ///
    /// # Errors
    /// Returns the last connection error, or `InvalidInput` if `addr`
    /// resolves to no address.
    pub fn connect(
        addr: impl ToSocketAddrs,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> io::Result<Self> {
        let mut last_err = None;
        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, connect_timeout) {
                Ok(stream) => return Self::from_stream(stream, read_timeout),
                Err(err) => {
                    debug!(addr = %candidate, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        }))
    }

    /// Wraps an already connected stream.
    ///
    /// # Errors
    /// Returns an error if the socket options cannot be applied.
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(read_timeout).filter(|t| !t.is_zero()))?;
        let peer = stream.peer_addr()?;
        debug!(%peer, "tcp transport connected");
        Ok(Self { stream, peer })
    }

    /// Returns the address of the counterparty.
    #[inline]
    #[must_use]
    pub const fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.stream.read(buf) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            )),
            other => timeout_as_empty(other),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }
}

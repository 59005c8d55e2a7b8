/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Byte-stream transport abstraction.
//!
//! A session talks to its counterparty through a [`Transport`]: an ordered,
//! reliable, blocking byte stream. Framing happens above it, in
//! [`Channel`](crate::Channel).

use std::io;

/// Ordered, reliable byte stream.
pub trait Transport {
    /// Reads available bytes into `buf`.
    ///
    /// Blocks until data arrives or the transport's read timeout expires.
    ///
    /// # Returns
    /// The number of bytes read. `Ok(0)` means nothing arrived in time; a
    /// closed stream is reported as an error, never as `Ok(0)`.
    ///
    /// # Errors
    /// Returns the underlying I/O error, or `UnexpectedEof` when the peer
    /// closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all of `bytes` and flushes them.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }
}

/// Maps the error kinds a socket read timeout surfaces as to `Ok(0)`.
pub(crate) fn timeout_as_empty(result: io::Result<usize>) -> io::Result<usize> {
    match result {
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(0)
        }
        other => other,
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Framed message channel.
//!
//! [`Channel`] couples a [`Transport`] with a [`FixCodec`] and hands out at
//! most one parsed message per read. Bytes that cannot be framed are dropped
//! up to the next `<SOH>8=` boundary.

use crate::codec::FixCodec;
use crate::transport::Transport;
use bytes::{Bytes, BytesMut};
use emberfix_tagvalue::{Message, MessageWriter, Printable};
use memchr::memmem;
use std::io;
use tokio_util::codec::Decoder as _;
use tracing::{trace, warn};

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 4096;

/// Boundary a resync skips to.
const FRAME_BOUNDARY: &[u8] = b"\x018=";

/// Message channel over a byte transport.
#[derive(Debug)]
pub struct Channel<T> {
    transport: T,
    codec: FixCodec,
    inbound: BytesMut,
}

impl<T: Transport> Channel<T> {
    /// Creates a channel.
    ///
    /// # Arguments
    /// * `transport` - The byte stream to frame
    /// * `max_message_size` - Largest inbound frame accepted, in bytes
    #[must_use]
    pub fn new(transport: T, max_message_size: usize) -> Self {
        Self {
            transport,
            // Message re-validates the checksum and reports failures as invalid frames
            codec: FixCodec::new()
                .with_max_message_size(max_message_size)
                .with_checksum_validation(false),
            inbound: BytesMut::with_capacity(max_message_size.min(READ_CHUNK * 4)),
        }
    }

    /// Reads zero or one message into `msg`.
    ///
    /// A frame already buffered is returned without touching the transport.
    /// Otherwise the transport is read once, which may block up to its read
    /// timeout.
    ///
    /// # Returns
    /// `true` if `msg` now holds a valid message. A malformed frame is
    /// consumed and reported as `false`.
    ///
    /// # Errors
    /// Returns the transport's I/O error.
    pub fn read(&mut self, msg: &mut Message) -> io::Result<bool> {
        msg.clear();
        if let Some(frame) = self.next_frame() {
            return Ok(msg.parse(frame));
        }

        if self.fill()? == 0 {
            return Ok(false);
        }

        Ok(match self.next_frame() {
            Some(frame) => msg.parse(frame),
            None => false,
        })
    }

    /// Writes a built message.
    ///
    /// # Errors
    /// Returns the transport's I/O error.
    pub fn write(&mut self, writer: &MessageWriter) -> io::Result<()> {
        trace!(message = %writer, "send");
        self.transport.write_all(writer.as_bytes())
    }

    /// Returns the number of received bytes not yet framed.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.inbound.len()
    }

    /// Returns a reference to the transport.
    #[inline]
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the channel and returns the transport.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn fill(&mut self) -> io::Result<usize> {
        let filled = self.inbound.len();
        self.inbound.resize(filled + READ_CHUNK, 0);
        let result = self.transport.read(&mut self.inbound[filled..]);
        let n = *result.as_ref().unwrap_or(&0);
        self.inbound.truncate(filled + n);
        result
    }

    fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            match self.codec.decode(&mut self.inbound) {
                Ok(frame) => return frame.map(BytesMut::freeze),
                Err(err) => {
                    let skip = resync_offset(&self.inbound);
                    let dropped = self.inbound.split_to(skip);
                    warn!(
                        error = %err,
                        bytes = dropped.len(),
                        dropped = %Printable(&dropped),
                        "discarding unframeable bytes"
                    );
                }
            }
        }
    }
}

/// Returns how many leading bytes to drop so the buffer starts at the next
/// frame boundary. Always at least 1 for a non-empty buffer.
fn resync_offset(buf: &[u8]) -> usize {
    match memmem::find(buf, FRAME_BOUNDARY) {
        Some(pos) => pos + 1,
        // keep a trailing SOH, it may be the start of the next boundary
        None if buf.len() > 1 && buf.last() == Some(&FRAME_BOUNDARY[0]) => buf.len() - 1,
        None => buf.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use emberfix_core::message::MsgType;

    const HEARTBEAT: &[u8] = b"8=FIX.4.2\x019=5\x0135=0\x0110=161\x01";

    #[test]
    fn test_resync_offset() {
        assert_eq!(resync_offset(b"garbage\x018=FIX"), 8);
        assert_eq!(resync_offset(b"\x018=FIX"), 1);
        assert_eq!(resync_offset(b"garbage"), 7);
        assert_eq!(resync_offset(b"garbage\x01"), 7);
        assert_eq!(resync_offset(b"\x01"), 1);
    }

    #[test]
    fn test_read_nothing() {
        let (transport, _handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut msg = Message::new();
        assert!(!channel.read(&mut msg).unwrap());
        assert!(!msg.is_valid());
    }

    #[test]
    fn test_read_split_frame() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut msg = Message::new();

        handle.push_inbound(&HEARTBEAT[..10]);
        assert!(!channel.read(&mut msg).unwrap());
        assert_eq!(channel.buffered(), 10);

        handle.push_inbound(&HEARTBEAT[10..]);
        assert!(channel.read(&mut msg).unwrap());
        assert_eq!(msg.msg_type(), Some(MsgType::Heartbeat));
        assert_eq!(channel.buffered(), 0);
    }

    #[test]
    fn test_one_message_per_read() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut msg = Message::new();

        handle.push_inbound([HEARTBEAT, HEARTBEAT].concat());
        assert!(channel.read(&mut msg).unwrap());
        assert_eq!(channel.buffered(), HEARTBEAT.len());
        assert_eq!(handle.inbound_len(), 0);
        assert!(channel.read(&mut msg).unwrap());
        assert!(!channel.read(&mut msg).unwrap());
    }

    #[test]
    fn test_garbage_is_skipped() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut msg = Message::new();

        handle.push_inbound([&b"junk\x01"[..], HEARTBEAT].concat());
        assert!(channel.read(&mut msg).unwrap());
        assert_eq!(msg.msg_type(), Some(MsgType::Heartbeat));
    }

    #[test]
    fn test_bad_checksum_is_invalid_not_error() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut msg = Message::new();

        handle.push_inbound(b"8=FIX.4.2\x019=5\x0135=0\x0110=000\x01");
        assert!(!channel.read(&mut msg).unwrap());
        assert_eq!(channel.buffered(), 0);
    }

    #[test]
    fn test_write_sends_built_frame() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        let mut writer = MessageWriter::new("FIX.4.2", 64);
        writer.prepare("0").build();

        channel.write(&writer).unwrap();
        assert_eq!(handle.pop_outbound().unwrap(), writer.as_bytes());
    }

    #[test]
    fn test_closed_transport_is_error() {
        let (transport, handle) = MemoryTransport::pair();
        let mut channel = Channel::new(transport, 1024);
        handle.close();
        let mut msg = Message::new();
        assert!(channel.read(&mut msg).is_err());
    }
}

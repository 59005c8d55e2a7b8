/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Reusable FIX message writer.
//!
//! [`MessageWriter`] renders outbound messages into one buffer that lives as
//! long as the session. Header space is reserved up front so the body can be
//! written in a single forward pass; [`MessageWriter::build`] then splices
//! `8=` and `9=` right-aligned in front of the body and appends `10=`.
//!
//! ```
//! use emberfix_tagvalue::MessageWriter;
//!
//! let mut writer = MessageWriter::new("FIX.4.2", 256);
//! writer.prepare("0").set(34, 2u64).build();
//! assert!(writer.to_string().starts_with("8=FIX.4.2|9=00010|35=0|34=2|"));
//! ```

use crate::checksum::{calculate_checksum, format_checksum};
use crate::decoder::SOH;
use crate::message::Printable;
use bytes::{BufMut, BytesMut};
use emberfix_core::tags;
use emberfix_core::types::{CompId, SeqNum, Timestamp};
use std::fmt;
use std::ops::Range;

/// Minimum number of digits rendered for BodyLength (tag 9).
pub const BODY_LENGTH_MIN_DIGITS: usize = 5;

/// Largest number of digits a `usize` body length can need.
const BODY_LENGTH_MAX_DIGITS: usize = 20;

/// A value that can be rendered into a FIX field.
pub trait FieldFormat {
    /// Appends the wire form of `self` to `buf`.
    fn write_value(&self, buf: &mut BytesMut);
}

impl FieldFormat for &str {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        buf.put_slice(self.as_bytes());
    }
}

impl FieldFormat for &[u8] {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }
}

impl FieldFormat for &CompId {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        buf.put_slice(self.as_str().as_bytes());
    }
}

macro_rules! impl_field_format_int {
    ($($t:ty),*) => {
        $(
            impl FieldFormat for $t {
                #[inline]
                fn write_value(&self, buf: &mut BytesMut) {
                    let mut itoa_buf = itoa::Buffer::new();
                    buf.put_slice(itoa_buf.format(*self).as_bytes());
                }
            }
        )*
    };
}

impl_field_format_int!(i32, i64, u32, u64, usize);

impl FieldFormat for SeqNum {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        self.value().write_value(buf);
    }
}

impl FieldFormat for Timestamp {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        buf.put_slice(self.format_millis().as_bytes());
    }
}

impl FieldFormat for bool {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        buf.put_u8(if *self { b'Y' } else { b'N' });
    }
}

impl FieldFormat for char {
    #[inline]
    fn write_value(&self, buf: &mut BytesMut) {
        let mut utf8 = [0u8; 4];
        buf.put_slice(self.encode_utf8(&mut utf8).as_bytes());
    }
}

/// Reusable builder for outbound FIX messages.
///
/// Lifecycle: [`prepare`](Self::prepare) → [`set`](Self::set)* →
/// [`build`](Self::build) → [`as_bytes`](Self::as_bytes). The same instance is
/// prepared again for the next message; the buffer keeps its allocation and
/// nothing from a previous message leaks into the next one.
#[derive(Debug)]
pub struct MessageWriter {
    buffer: BytesMut,
    begin_string: String,
    /// Bytes reserved in front of the body for `8=...|9=...|`.
    header_reserve: usize,
    /// Offset of `8=` once built.
    frame_start: usize,
    /// Offset just past the last body byte once built.
    body_end: usize,
    msg_type: Range<usize>,
    built: bool,
}

impl MessageWriter {
    /// Creates a writer for the given protocol version.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.2")
    /// * `capacity` - Initial buffer capacity in bytes
    #[must_use]
    pub fn new(begin_string: impl Into<String>, capacity: usize) -> Self {
        let begin_string = begin_string.into();
        // "8=" value SOH "9=" digits SOH
        let header_reserve = 2 + begin_string.len() + 1 + 2 + BODY_LENGTH_MAX_DIGITS + 1;

        let mut writer = Self {
            buffer: BytesMut::with_capacity(capacity.max(header_reserve)),
            begin_string,
            header_reserve,
            frame_start: 0,
            body_end: 0,
            msg_type: 0..0,
            built: false,
        };
        writer.reset();
        writer
    }

    /// Starts a new message of type `msg_type`, discarding the previous one.
    ///
    /// MsgType (tag 35) is written immediately as the first body field.
    pub fn prepare(&mut self, msg_type: &str) -> &mut Self {
        self.reset();
        let value_start = self.buffer.len() + 3;
        self.set(tags::MSG_TYPE, msg_type);
        self.msg_type = value_start..value_start + msg_type.len();
        self
    }

    /// Appends `tag=value<SOH>` to the body.
    ///
    /// Setting a field on a built message reopens it: the trailer is dropped
    /// and the next [`build`](Self::build) recomputes the framing.
    pub fn set<V: FieldFormat>(&mut self, tag: u32, value: V) -> &mut Self {
        if self.built {
            self.buffer.truncate(self.body_end);
            self.built = false;
        }

        let mut tag_buf = itoa::Buffer::new();
        self.buffer.put_slice(tag_buf.format(tag).as_bytes());
        self.buffer.put_u8(b'=');
        value.write_value(&mut self.buffer);
        self.buffer.put_u8(SOH);
        self
    }

    /// Finalizes the message: writes BeginString and a zero-padded BodyLength
    /// in front of the body and appends the CheckSum.
    ///
    /// Building an already built message is a no-op.
    pub fn build(&mut self) -> &mut Self {
        if self.built {
            return self;
        }

        let body_len = self.buffer.len() - self.header_reserve;
        let mut len_buf = itoa::Buffer::new();
        let digits = len_buf.format(body_len).as_bytes();
        let padding = BODY_LENGTH_MIN_DIGITS.saturating_sub(digits.len());
        let header_len = 2 + self.begin_string.len() + 1 + 2 + padding + digits.len() + 1;

        let start = self.header_reserve - header_len;
        let mut header = &mut self.buffer[start..self.header_reserve];
        header.put_slice(b"8=");
        header.put_slice(self.begin_string.as_bytes());
        header.put_u8(SOH);
        header.put_slice(b"9=");
        header.put_bytes(b'0', padding);
        header.put_slice(digits);
        header.put_u8(SOH);

        self.body_end = self.buffer.len();
        let checksum = calculate_checksum(&self.buffer[start..]);
        self.buffer.put_slice(b"10=");
        self.buffer.put_slice(&format_checksum(checksum));
        self.buffer.put_u8(SOH);

        self.frame_start = start;
        self.built = true;
        self
    }

    /// Returns the framed message, or an empty slice before [`build`](Self::build).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        if self.built {
            &self.buffer[self.frame_start..]
        } else {
            &[]
        }
    }

    /// Returns true once [`build`](Self::build) has framed the current message.
    #[inline]
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Returns the MsgType of the current message.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        std::str::from_utf8(&self.buffer[self.msg_type.clone()]).unwrap_or_default()
    }

    /// Returns the protocol version this writer frames messages with.
    #[inline]
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.resize(self.header_reserve, 0);
        self.frame_start = 0;
        self.body_end = 0;
        self.msg_type = 0..0;
        self.built = false;
    }
}

impl fmt::Display for MessageWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Printable(self.as_bytes()), f)
    }
}

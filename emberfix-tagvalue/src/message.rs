/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Reusable parsed FIX message.
//!
//! A [`Message`] owns one inbound frame and an index of its fields. It is
//! created once per session and re-filled on every receive cycle:
//!
//! ```
//! use bytes::Bytes;
//! use emberfix_tagvalue::Message;
//!
//! let mut msg = Message::new();
//! let frame = Bytes::from_static(b"8=FIX.4.2\x019=5\x0135=0\x0110=161\x01");
//! assert!(msg.parse(frame));
//! assert!(msg.field(35).is("0"));
//! ```
//!
//! Framing problems never surface as errors. A frame that fails validation is
//! reported through [`Message::is_valid`] and logged at debug level.

use crate::checksum::{calculate_checksum, parse_checksum};
use crate::decoder::{Decoder, Token};
use bytes::Bytes;
use emberfix_core::error::DecodeError;
use emberfix_core::field::{Field, parse_u64};
use emberfix_core::message::MsgType;
use emberfix_core::tags;
use smallvec::SmallVec;
use std::fmt;
use tracing::debug;

/// Inline capacity of the field index; longer messages spill to the heap.
const INLINE_FIELDS: usize = 32;

/// A parsed, validated FIX message.
#[derive(Debug, Clone, Default)]
pub struct Message {
    buffer: Bytes,
    fields: SmallVec<[Token; INLINE_FIELDS]>,
    valid: bool,
}

impl Message {
    /// Creates an empty, invalid message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the current frame and its field index.
    ///
    /// Any [`Field`] borrowed from this message must be gone before this call;
    /// the borrow checker enforces it.
    pub fn clear(&mut self) {
        self.buffer = Bytes::new();
        self.fields.clear();
        self.valid = false;
    }

    /// Replaces the content of this message with `frame` and indexes it.
    ///
    /// # Arguments
    /// * `frame` - One complete frame, starting at `8=`
    ///
    /// # Returns
    /// `true` if the frame is a well-formed FIX message.
    pub fn parse(&mut self, frame: Bytes) -> bool {
        self.clear();
        self.buffer = frame;

        match index_fields(&self.buffer, &mut self.fields) {
            Ok(()) => self.valid = true,
            Err(err) => {
                debug!(error = %err, frame = %Printable(&self.buffer), "discarding malformed frame");
                self.fields.clear();
            }
        }

        self.valid
    }

    /// Returns true if the last parse produced a well-formed message.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns true if the message carries `tag`.
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.fields.iter().any(|t| t.tag == tag)
    }

    /// Looks up a field.
    ///
    /// When a tag occurs more than once, the first occurrence is returned.
    /// An absent tag yields [`Field::absent`].
    #[must_use]
    pub fn field(&self, tag: u32) -> Field<'_> {
        self.fields
            .iter()
            .find(|t| t.tag == tag)
            .map_or(Field::absent(tag), |t| {
                Field::new(tag, &self.buffer[t.value.clone()])
            })
    }

    /// Iterates all fields in wire order, duplicates included.
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> {
        self.fields
            .iter()
            .map(|t| Field::new(t.tag, &self.buffer[t.value.clone()]))
    }

    /// Returns the number of indexed fields, header and trailer included.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the decoded MsgType (tag 35), if present and well-formed.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.field(tags::MSG_TYPE)
            .as_bytes()
            .and_then(MsgType::from_bytes)
    }

    /// Returns the raw frame bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Printable(&self.buffer), f)
    }
}

/// Renders FIX bytes with SOH shown as `|`.
#[derive(Debug, Clone, Copy)]
pub struct Printable<'a>(pub &'a [u8]);

impl fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            for c in chunk.valid().chars() {
                if c == '\x01' {
                    f.write_str("|")?;
                } else {
                    fmt::Write::write_char(f, c)?;
                }
            }
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

/// Indexes `buf` into `fields`, validating the framing on the way.
fn index_fields(
    buf: &[u8],
    fields: &mut SmallVec<[Token; INLINE_FIELDS]>,
) -> Result<(), DecodeError> {
    let mut decoder = Decoder::new(buf);

    let begin = decoder.next_field().ok_or(DecodeError::Incomplete)?;
    if begin.tag != tags::BEGIN_STRING {
        return Err(DecodeError::InvalidBeginString);
    }
    fields.push(begin);

    let body_length = decoder
        .next_field()
        .filter(|t| t.tag == tags::BODY_LENGTH)
        .ok_or(DecodeError::MissingBodyLength)?;
    let declared = parse_u64(&buf[body_length.value.clone()])
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(DecodeError::InvalidBodyLength)?;
    fields.push(body_length);

    let body_start = decoder.offset();

    loop {
        let token = decoder.next_field().ok_or(DecodeError::MissingChecksum)?;
        if token.tag != tags::CHECKSUM {
            fields.push(token);
            continue;
        }

        let actual = token.start - body_start;
        if actual != declared {
            return Err(DecodeError::BodyLengthMismatch { declared, actual });
        }

        let declared = parse_checksum(&buf[token.value.clone()]).ok_or(
            DecodeError::InvalidFieldValue {
                tag: tags::CHECKSUM,
                reason: "expected a 3-digit checksum",
            },
        )?;
        let calculated = calculate_checksum(&buf[..token.start]);
        if calculated != declared {
            return Err(DecodeError::ChecksumMismatch {
                calculated,
                declared,
            });
        }

        fields.push(token);
        return Ok(());
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Codec for FIX message framing.
//!
//! [`FixCodec`] cuts complete frames out of a byte stream using BeginString
//! and BodyLength. It implements the `tokio_util` codec traits so it can sit
//! under a `Framed` stream, and the synchronous [`Channel`](crate::Channel)
//! drives the same `decode` by hand.

use bytes::{BufMut, BytesMut};
use emberfix_tagvalue::checksum::{calculate_checksum, parse_checksum};
use emberfix_tagvalue::decoder::SOH;
use memchr::memchr;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Message is incomplete, need more data.
    #[error("incomplete message")]
    Incomplete,

    /// Invalid BeginString field.
    #[error("invalid begin string: message must start with 8=")]
    InvalidBeginString,

    /// Missing BodyLength field.
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// BodyLength does not land on a `10=NNN<SOH>` trailer.
    #[error("body length does not end at the checksum field")]
    InvalidTrailer,

    /// Checksum mismatch.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum.
        calculated: u8,
        /// Declared checksum in message.
        declared: u8,
    },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Length of `10=NNN<SOH>`.
const TRAILER_LEN: usize = 7;

/// Shortest possible frame: `8=X|9=0|10=NNN|`.
const MIN_FRAME_LEN: usize = 15;

/// Default maximum frame size when none is configured.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65536;

/// Tokio codec for FIX message framing.
///
/// Splits FIX messages out of a byte stream, validating BeginString,
/// BodyLength and the trailer position, and optionally the checksum. Frames
/// larger than the configured maximum are rejected.
#[derive(Debug, Clone)]
pub struct FixCodec {
    /// Maximum message size in bytes.
    max_message_size: usize,
    /// Whether to validate checksums.
    validate_checksum: bool,
}

impl FixCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            validate_checksum: true,
        }
    }

    /// Sets the maximum message size.
    ///
    /// # Arguments
    /// * `size` - Largest frame, in bytes, the codec will buffer
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    ///
    /// Disable it when a later stage validates the whole frame anyway.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let prefix = src.len().min(2);
        if src[..prefix] != b"8="[..prefix] {
            return Err(CodecError::InvalidBeginString);
        }

        if src.len() < MIN_FRAME_LEN {
            return Ok(None);
        }

        // Find first SOH to get BeginString value
        let first_soh = match memchr(SOH, src) {
            Some(pos) => pos,
            None => return Ok(None),
        };

        // Find BodyLength field (9=XXX|)
        let body_len_start = first_soh + 1;
        if src.len() < body_len_start + 3 {
            return Ok(None);
        }

        if &src[body_len_start..body_len_start + 2] != b"9=" {
            return Err(CodecError::MissingBodyLength);
        }

        // Find SOH after BodyLength
        let body_len_soh = match memchr(SOH, &src[body_len_start..]) {
            Some(pos) => body_len_start + pos,
            None => return Ok(None),
        };

        let body_length = emberfix_core::field::parse_u64(&src[body_len_start + 2..body_len_soh])
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(CodecError::InvalidBodyLength)?;

        // BodyLength counts from after 9=NNN| to just before 10=
        let total_length = (body_len_soh + 1)
            .checked_add(body_length)
            .and_then(|n| n.checked_add(TRAILER_LEN))
            .ok_or(CodecError::InvalidBodyLength)?;

        // Check maximum size
        if total_length > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size: total_length,
                max_size: self.max_message_size,
            });
        }

        // Check if we have the complete message
        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let trailer_start = total_length - TRAILER_LEN;
        if &src[trailer_start..trailer_start + 3] != b"10=" || src[total_length - 1] != SOH {
            return Err(CodecError::InvalidTrailer);
        }

        if self.validate_checksum {
            let checksum_bytes = &src[trailer_start + 3..total_length - 1];
            let declared = parse_checksum(checksum_bytes).ok_or(CodecError::InvalidTrailer)?;
            let calculated = calculate_checksum(&src[..trailer_start]);

            if calculated != declared {
                return Err(CodecError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        Ok(Some(src.split_to(total_length)))
    }
}

impl Encoder<&[u8]> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Zero-copy FIX field tokenizer.
//!
//! The decoder walks a byte buffer one `tag=value<SOH>` field at a time and
//! yields offsets into the buffer instead of copies. Message-level validation
//! (header order, body length, checksum) is layered on top by
//! [`Message`](crate::Message).

use memchr::memchr;
use std::ops::Range;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Position of one field inside a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Field tag number.
    pub tag: u32,
    /// Offset of the first tag byte.
    pub start: usize,
    /// Offsets of the value bytes, delimiters excluded.
    pub value: Range<usize>,
}

/// Zero-copy FIX field decoder.
///
/// Yields [`Token`]s until the buffer is exhausted or the next field is
/// malformed or truncated.
#[derive(Debug)]
pub struct Decoder<'a> {
    /// Input buffer.
    input: &'a [u8],
    /// Current position in the buffer.
    offset: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    ///
    /// # Arguments
    /// * `input` - The FIX message bytes to tokenize
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Parses the next field from the buffer.
    ///
    /// # Returns
    /// The next field, or `None` if the buffer is exhausted, the tag is not a
    /// number, or the field has no terminating SOH.
    #[inline]
    pub fn next_field(&mut self) -> Option<Token> {
        if self.offset >= self.input.len() {
            return None;
        }

        let start = self.offset;
        let remaining = &self.input[start..];

        let eq_pos = memchr(EQUALS, remaining)?;
        let tag = parse_tag(&remaining[..eq_pos])?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..])?;

        self.offset = start + value_start + soh_pos + 1;

        Some(Token {
            tag,
            start,
            value: start + value_start..start + value_start + soh_pos,
        })
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the remaining bytes in the buffer.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }
}

impl Iterator for Decoder<'_> {
    type Item = Token;

    #[inline]
    fn next(&mut self) -> Option<Token> {
        self.next_field()
    }
}

/// Parses a tag number from ASCII bytes.
///
/// # Arguments
/// * `bytes` - The ASCII bytes representing the tag number
///
/// # Returns
/// The parsed tag number, or `None` if invalid.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    Some(result)
}

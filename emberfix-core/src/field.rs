/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field views for FIX protocol messages.
//!
//! This module provides:
//! - [`Field`]: Zero-copy view of one field within a message buffer
//! - [`FieldEq`]: Allocation-free comparison of raw field bytes against typed values
//!
//! A field supports two access modes. [`Field::is`] compares against a typed value
//! and returns `false` on any decode failure or absence. The `as_*` accessors decode
//! the value and return a [`DecodeError`] when that is not possible, for the read
//! paths where the engine needs the value itself.

use crate::error::DecodeError;
use crate::types::{CompId, SeqNum, Timestamp};

/// Zero-copy view of a field within a FIX message buffer.
///
/// The view borrows the value bytes (without delimiters) from the message it was
/// looked up in. A lookup for a tag the message does not carry yields an absent
/// field whose comparisons are always `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    tag: u32,
    value: Option<&'a [u8]>,
}

impl<'a> Field<'a> {
    /// Creates a view over a present field value.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The value bytes, without the `tag=` prefix or the SOH delimiter
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self {
            tag,
            value: Some(value),
        }
    }

    /// Creates a view for a tag that is not present.
    #[inline]
    #[must_use]
    pub const fn absent(tag: u32) -> Self {
        Self { tag, value: None }
    }

    /// Returns the field tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns true if the message carried this field.
    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the raw value bytes, if present.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&'a [u8]> {
        self.value
    }

    /// Returns true only if the field is present, decodes as the type of
    /// `expected`, and equals it.
    #[inline]
    #[must_use]
    pub fn is<V: FieldEq>(&self, expected: V) -> bool {
        self.value.is_some_and(|raw| expected.matches(raw))
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingRequiredField` if absent, or
    /// `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        std::str::from_utf8(self.raw()?).map_err(DecodeError::from)
    }

    /// Returns the value as a signed integer.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingRequiredField` if absent, or
    /// `DecodeError::InvalidFieldValue` if the value is not an integer.
    pub fn as_long(&self) -> Result<i64, DecodeError> {
        parse_long(self.raw()?).ok_or(DecodeError::InvalidFieldValue {
            tag: self.tag,
            reason: "expected an integer",
        })
    }

    /// Returns the value as an unsigned integer.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingRequiredField` if absent, or
    /// `DecodeError::InvalidFieldValue` if the value is not an unsigned integer.
    pub fn as_u64(&self) -> Result<u64, DecodeError> {
        parse_u64(self.raw()?).ok_or(DecodeError::InvalidFieldValue {
            tag: self.tag,
            reason: "expected an unsigned integer",
        })
    }

    /// Returns the value as a sequence number.
    ///
    /// # Errors
    /// Same as [`Field::as_u64`].
    pub fn as_seq_num(&self) -> Result<SeqNum, DecodeError> {
        self.as_u64().map(SeqNum::new)
    }

    /// Returns the value as a UTC timestamp.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingRequiredField` if absent, or
    /// `DecodeError::InvalidFieldValue` if the value is not `YYYYMMDD-HH:MM:SS[.sss]`.
    pub fn as_timestamp(&self) -> Result<Timestamp, DecodeError> {
        Timestamp::parse_fix(self.raw()?).ok_or(DecodeError::InvalidFieldValue {
            tag: self.tag,
            reason: "expected YYYYMMDD-HH:MM:SS[.sss]",
        })
    }

    /// Returns the value as a bool (FIX uses 'Y'/'N').
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidFieldValue` if the value is not 'Y' or 'N'.
    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self.raw()? {
            b"Y" => Ok(true),
            b"N" => Ok(false),
            _ => Err(DecodeError::InvalidFieldValue {
                tag: self.tag,
                reason: "expected 'Y' or 'N'",
            }),
        }
    }

    #[inline]
    fn raw(&self) -> Result<&'a [u8], DecodeError> {
        self.value
            .ok_or(DecodeError::MissingRequiredField { tag: self.tag })
    }
}

/// Comparison of raw field bytes against a typed value.
///
/// Implementations decode without allocating and return `false` when the bytes do
/// not decode as the implementing type.
pub trait FieldEq {
    /// Returns true if `raw` decodes as `Self` and equals `self`.
    fn matches(&self, raw: &[u8]) -> bool;
}

impl FieldEq for &str {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        raw == self.as_bytes()
    }
}

impl FieldEq for &CompId {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        raw == self.as_str().as_bytes()
    }
}

impl FieldEq for i64 {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        parse_long(raw) == Some(*self)
    }
}

impl FieldEq for i32 {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        parse_long(raw) == Some(i64::from(*self))
    }
}

impl FieldEq for u64 {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        parse_u64(raw) == Some(*self)
    }
}

impl FieldEq for u32 {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        parse_u64(raw) == Some(u64::from(*self))
    }
}

impl FieldEq for SeqNum {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        parse_u64(raw) == Some(self.value())
    }
}

impl FieldEq for Timestamp {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        Timestamp::parse_fix(raw) == Some(*self)
    }
}

impl FieldEq for bool {
    #[inline]
    fn matches(&self, raw: &[u8]) -> bool {
        raw == if *self { b"Y" } else { b"N" }
    }
}

/// Parses an unsigned decimal integer from ASCII bytes.
///
/// # Returns
/// `None` if the input is empty, contains anything but digits, or overflows.
#[inline]
#[must_use]
pub fn parse_u64(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }

    let mut result: u64 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }

    Some(result)
}

/// Parses a signed decimal integer (optional leading `-`) from ASCII bytes.
///
/// # Returns
/// `None` if the input is not a well-formed integer or overflows.
#[inline]
#[must_use]
pub fn parse_long(bytes: &[u8]) -> Option<i64> {
    match bytes.split_first() {
        Some((b'-', digits)) => {
            let magnitude = parse_u64(digits)?;
            0i64.checked_sub_unsigned(magnitude)
        }
        _ => i64::try_from(parse_u64(bytes)?).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_field(raw: &'static [u8]) -> Field<'static> {
        // value sits between "34=" and the trailing SOH
        Field::new(34, &raw[3..raw.len() - 1])
    }

    #[test]
    fn test_is_long_false_when_not_a_number() {
        assert!(!seq_field(b"34=XXXXX\x01").is(12345i64));
    }

    #[test]
    fn test_is_long_false_when_not_equal() {
        assert!(!seq_field(b"34=54321\x01").is(12345i64));
    }

    #[test]
    fn test_is_long_true_when_equal() {
        assert!(seq_field(b"34=12345\x01").is(12345i64));
        assert!(seq_field(b"34=12345\x01").is(12345));
        assert!(seq_field(b"34=12345\x01").is(SeqNum::new(12345)));
    }

    #[test]
    fn test_absent_field_never_matches() {
        let field = Field::absent(112);
        assert!(!field.is_present());
        assert!(!field.is(""));
        assert!(!field.is(0));
        assert!(matches!(
            field.as_str(),
            Err(DecodeError::MissingRequiredField { tag: 112 })
        ));
    }

    #[test]
    fn test_is_str() {
        let field = Field::new(141, b"Y");
        assert!(field.is("Y"));
        assert!(!field.is("N"));
        assert!(field.is(true));
        assert!(field.as_bool().unwrap());
    }

    #[test]
    fn test_is_timestamp() {
        let field = Field::new(52, b"20170623-14:51:45.012");
        let ts = Timestamp::parse_fix(b"20170623-14:51:45.012").unwrap();
        assert!(field.is(ts));
        assert!(!field.is(Timestamp::from_millis(0)));
        assert!(!Field::new(52, b"garbage").is(ts));
        assert_eq!(field.as_timestamp().unwrap(), ts);
    }

    #[test]
    fn test_as_long() {
        assert_eq!(Field::new(36, b"42").as_long().unwrap(), 42);
        assert_eq!(Field::new(36, b"-42").as_long().unwrap(), -42);
        assert!(Field::new(36, b"XXXXX").as_long().is_err());
        assert!(Field::new(36, b"").as_long().is_err());
        assert!(Field::new(36, b"-").as_long().is_err());
        assert!(Field::new(36, b" 42").as_long().is_err());
        assert!(Field::new(36, b"99999999999999999999").as_long().is_err());
    }

    #[test]
    fn test_parse_long_extremes() {
        assert_eq!(parse_long(b"9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_long(b"-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_long(b"9223372036854775808"), None);
    }

    #[test]
    fn test_invalid_utf8() {
        let field = Field::new(58, &[0xFF, 0xFE]);
        assert!(field.as_str().is_err());
        assert!(!field.is("\u{FFFD}"));
    }
}

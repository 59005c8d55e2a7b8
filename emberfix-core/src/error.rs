/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the EmberFix FIX session engine.
//!
//! This module provides a unified error hierarchy using `thiserror`. Two classes of
//! failure exist: fatal protocol violations ([`SessionError`]) that terminate a
//! session, and decode failures ([`DecodeError`]) raised when the engine itself needs
//! a field value that cannot be read. Malformed inbound frames are never errors; the
//! parser marks them invalid and only logs the [`DecodeError`] describing why.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all EmberFix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error while decoding a field value the engine depends on.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Fatal session layer protocol violation.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error from the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixError {
    /// Returns the session error if this is a protocol violation.
    #[must_use]
    pub fn as_session(&self) -> Option<&SessionError> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors that occur while decoding FIX messages or field values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Message does not start with a BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// BodyLength does not end where the CheckSum field starts.
    #[error("body length mismatch: declared {declared}, actual {actual}")]
    BodyLengthMismatch {
        /// Declared body length.
        declared: usize,
        /// Byte count between BodyLength and CheckSum.
        actual: usize,
    },

    /// Missing CheckSum field (tag 10).
    #[error("missing checksum field (tag 10)")]
    MissingChecksum,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// Missing required field.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: &'static str,
    },

    /// Invalid UTF-8 in string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Fatal session layer protocol violations.
///
/// Every variant terminates the session. Reconnection policy belongs to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session is not in the correct state for the operation.
    #[error("invalid session state: expected {expected}, current {current}")]
    InvalidState {
        /// Expected state for the operation.
        expected: &'static str,
        /// Current session state.
        current: &'static str,
    },

    /// Inbound BeginString does not match the configured protocol version.
    #[error("unexpected begin string received")]
    UnexpectedBeginString,

    /// Inbound SenderCompID/TargetCompID do not mirror the configured identifiers.
    #[error("unexpected comp id received (tag {tag})")]
    UnexpectedCompId {
        /// The tag that failed validation (49 or 56).
        tag: u32,
    },

    /// Sequence number too low (duplicate or replay).
    #[error("sequence number too low: expected {expected}, received {received}")]
    SequenceTooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// A sequence number cannot advance past `u64::MAX`.
    #[error("sequence number space exhausted ({direction})")]
    SequenceExhausted {
        /// `"inbound"` or `"outbound"`.
        direction: &'static str,
    },

    /// No valid Logon arrived within the logon window.
    #[error("logon response not received on time ({elapsed_ms} ms)")]
    LogonTimeout {
        /// Elapsed time in milliseconds since the logon window opened.
        elapsed_ms: u64,
    },

    /// The counterparty's Logon failed validation.
    #[error("logon rejected: {reason}")]
    LogonRejected {
        /// Reason for rejection.
        reason: &'static str,
    },

    /// ResendRequest with a bounded EndSeqNo.
    #[error("unsupported resend request received (partial gap fills are not supported, end {end_seq_no})")]
    UnsupportedResendRequest {
        /// The EndSeqNo (tag 16) received.
        end_seq_no: u64,
    },

    /// SequenceReset without GapFillFlag=Y.
    #[error("unsupported sequence reset received (hard reset)")]
    UnsupportedSequenceReset,

    /// SequenceReset that does not move the inbound sequence forward.
    #[error("invalid sequence reset received: new seq num {new_seq_no} not above {expected}")]
    InvalidSequenceReset {
        /// Currently expected inbound sequence number.
        expected: u64,
        /// The NewSeqNo (tag 36) received.
        new_seq_no: u64,
    },

    /// Nothing received for longer than twice the heartbeat interval.
    #[error("did not receive any messages for too long ({elapsed_ms} ms)")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since the last accepted message.
        elapsed_ms: u64,
    },

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

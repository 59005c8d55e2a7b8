/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message types handled by the session layer.

use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a MsgType value in bytes.
pub const MSG_TYPE_MAX_LEN: usize = 8;

/// FIX message types.
///
/// The session layer only acts on the administrative types; everything else is
/// carried as [`MsgType::Other`] and handed to the application layer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Logon (A) - Session level.
    Logon,
    /// Any other message type.
    Other(ArrayString<MSG_TYPE_MAX_LEN>),
}

impl MsgType {
    /// Parses a MsgType from the raw value of tag 35.
    ///
    /// # Returns
    /// `None` if the value is empty, not UTF-8, or longer than [`MSG_TYPE_MAX_LEN`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let msg_type = match bytes {
            b"0" => Self::Heartbeat,
            b"1" => Self::TestRequest,
            b"2" => Self::ResendRequest,
            b"3" => Self::Reject,
            b"4" => Self::SequenceReset,
            b"5" => Self::Logout,
            b"A" => Self::Logon,
            [] => return None,
            other => {
                let s = std::str::from_utf8(other).ok()?;
                Self::Other(ArrayString::from(s).ok()?)
            }
        };
        Some(msg_type)
    }

    /// Returns the wire value of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::Logon => "A",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Returns true if this is a session-level administrative message.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::str::FromStr for MsgType {
    type Err = crate::error::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes()).ok_or(crate::error::DecodeError::InvalidFieldValue {
            tag: crate::tags::MSG_TYPE,
            reason: "expected a message type of 1 to 8 characters",
        })
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Inbound sequence number classification.

use emberfix_core::types::SeqNum;

/// Result of comparing a received MsgSeqNum with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// Sequence number is as expected.
    InOrder,
    /// Sequence number is lower than expected (duplicate or replay).
    TooLow {
        /// Expected sequence number.
        expected: SeqNum,
        /// Received sequence number.
        received: SeqNum,
    },
    /// Sequence number is higher than expected; messages were missed.
    Gap {
        /// Expected sequence number, the first one missing.
        expected: SeqNum,
        /// Received sequence number.
        received: SeqNum,
    },
}

impl SequenceCheck {
    /// Classifies `received` against `expected`.
    #[inline]
    #[must_use]
    pub fn classify(expected: SeqNum, received: SeqNum) -> Self {
        use std::cmp::Ordering;

        match received.cmp(&expected) {
            Ordering::Equal => Self::InOrder,
            Ordering::Less => Self::TooLow { expected, received },
            Ordering::Greater => Self::Gap { expected, received },
        }
    }

    /// Returns true if the sequence number is as expected.
    #[inline]
    #[must_use]
    pub const fn is_in_order(&self) -> bool {
        matches!(self, Self::InOrder)
    }

    /// Returns the number of missing messages for a gap, zero otherwise.
    #[inline]
    #[must_use]
    pub const fn gap_size(&self) -> u64 {
        match self {
            Self::Gap { expected, received } => received.value() - expected.value(),
            _ => 0,
        }
    }
}

/// How far an accepted inbound message moves the expected sequence number.
///
/// Each accepted message produces exactly one `Advance`, applied once after
/// the message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Expect the next sequence number.
    Next,
    /// Expect exactly this sequence number next (SequenceReset-GapFill).
    To(SeqNum),
}

impl Advance {
    /// Applies this advance to `current`.
    ///
    /// # Returns
    /// `None` if `current` is already the largest sequence number.
    #[inline]
    #[must_use]
    pub const fn apply(self, current: SeqNum) -> Option<SeqNum> {
        match self {
            Self::Next => current.checked_next(),
            Self::To(seq) => Some(seq),
        }
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session state.
//!
//! [`State`] holds the sequence counters, liveness timestamps and recovery
//! flags of one session. It is owned by the [`Session`](crate::Session) and
//! only changes through the narrow operations below, so every change of a
//! counter has exactly one call site.

use crate::sequence::Advance;
use emberfix_core::error::SessionError;
use emberfix_core::types::{SeqNum, Timestamp};
use std::fmt;

/// Mutable state of a FIX session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    inbound_seq_num: SeqNum,
    outbound_seq_num: SeqNum,
    inbound_timestamp: Timestamp,
    outbound_timestamp: Timestamp,
    synchronizing: bool,
    test_request_pending: bool,
}

impl State {
    /// Creates the state of a fresh session.
    ///
    /// # Arguments
    /// * `inbound_seq_num` - First inbound sequence number expected
    /// * `outbound_seq_num` - First outbound sequence number to send
    /// * `now` - Initial value of both liveness timestamps
    #[must_use]
    pub const fn new(inbound_seq_num: SeqNum, outbound_seq_num: SeqNum, now: Timestamp) -> Self {
        Self {
            inbound_seq_num,
            outbound_seq_num,
            inbound_timestamp: now,
            outbound_timestamp: now,
            synchronizing: false,
            test_request_pending: false,
        }
    }

    /// Next inbound sequence number expected.
    #[inline]
    #[must_use]
    pub const fn inbound_seq_num(&self) -> SeqNum {
        self.inbound_seq_num
    }

    /// Next outbound sequence number to send.
    #[inline]
    #[must_use]
    pub const fn outbound_seq_num(&self) -> SeqNum {
        self.outbound_seq_num
    }

    /// Time the last inbound message was accepted.
    #[inline]
    #[must_use]
    pub const fn inbound_timestamp(&self) -> Timestamp {
        self.inbound_timestamp
    }

    /// Time the last outbound message was sent.
    #[inline]
    #[must_use]
    pub const fn outbound_timestamp(&self) -> Timestamp {
        self.outbound_timestamp
    }

    /// True while a ResendRequest we sent is outstanding.
    #[inline]
    #[must_use]
    pub const fn synchronizing(&self) -> bool {
        self.synchronizing
    }

    /// True while a TestRequest we sent is unanswered.
    #[inline]
    #[must_use]
    pub const fn test_request_pending(&self) -> bool {
        self.test_request_pending
    }

    pub(crate) const fn restart_timers(&mut self, now: Timestamp) {
        self.inbound_timestamp = now;
        self.outbound_timestamp = now;
    }

    /// An in-sequence message arrived: recovery and probing are over.
    pub(crate) const fn clear_recovery(&mut self) {
        self.synchronizing = false;
        self.test_request_pending = false;
    }

    /// Applies the single advance an accepted inbound message produces.
    pub(crate) fn advance_inbound(
        &mut self,
        advance: Advance,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        let Some(next) = advance.apply(self.inbound_seq_num) else {
            return Err(SessionError::SequenceExhausted {
                direction: "inbound",
            });
        };
        self.inbound_seq_num = next;
        self.inbound_timestamp = now;
        Ok(())
    }

    pub(crate) fn record_outbound(&mut self, now: Timestamp) -> Result<(), SessionError> {
        let Some(next) = self.outbound_seq_num.checked_next() else {
            return Err(SessionError::SequenceExhausted {
                direction: "outbound",
            });
        };
        self.outbound_seq_num = next;
        self.outbound_timestamp = now;
        Ok(())
    }

    /// Gives back the sequence number consumed by a gap fill reply, whose
    /// MsgSeqNum is the requester's BeginSeqNo rather than ours.
    // TODO: confirm whether a gap fill reply should consume an outbound sequence number.
    pub(crate) const fn release_outbound_seq_num(&mut self) {
        self.outbound_seq_num = self.outbound_seq_num.prev();
    }

    pub(crate) const fn begin_synchronizing(&mut self) {
        self.synchronizing = true;
    }

    pub(crate) const fn begin_test_request(&mut self) {
        self.test_request_pending = true;
    }
}

/// Externally visible phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, logon not started.
    Idle,
    /// Logon started, no valid Logon received yet.
    LoggingOn,
    /// Logged on, inbound sequence in order.
    Synchronized,
    /// Logged on, waiting for the answer to a ResendRequest.
    Synchronizing,
    /// A fatal error ended the session.
    Terminated,
}

impl Phase {
    /// Returns a short lowercase name for logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoggingOn => "logging on",
            Self::Synchronized => "synchronized",
            Self::Synchronizing => "synchronizing",
            Self::Terminated => "terminated",
        }
    }

    /// Returns true once the logon handshake has completed and the session
    /// has not terminated.
    #[must_use]
    pub const fn is_established(&self) -> bool {
        matches!(self, Self::Synchronized | Self::Synchronizing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        State::new(SeqNum::new(1), SeqNum::new(1), Timestamp::from_millis(0))
    }

    #[test]
    fn test_advance_inbound() {
        let mut state = state();
        state
            .advance_inbound(Advance::Next, Timestamp::from_millis(10))
            .unwrap();
        assert_eq!(state.inbound_seq_num(), SeqNum::new(2));
        assert_eq!(state.inbound_timestamp(), Timestamp::from_millis(10));

        state
            .advance_inbound(Advance::To(SeqNum::new(9)), Timestamp::from_millis(20))
            .unwrap();
        assert_eq!(state.inbound_seq_num(), SeqNum::new(9));
        assert_eq!(state.outbound_seq_num(), SeqNum::new(1));
    }

    #[test]
    fn test_gap_fill_send_is_net_zero() {
        let mut state = state();
        state.record_outbound(Timestamp::from_millis(5)).unwrap();
        state.release_outbound_seq_num();
        assert_eq!(state.outbound_seq_num(), SeqNum::new(1));
        assert_eq!(state.outbound_timestamp(), Timestamp::from_millis(5));
    }

    #[test]
    fn test_exhausted_sequence_numbers_do_not_wrap() {
        let mut state = State::new(
            SeqNum::new(u64::MAX),
            SeqNum::new(u64::MAX),
            Timestamp::from_millis(0),
        );
        assert_eq!(
            state.advance_inbound(Advance::Next, Timestamp::from_millis(10)),
            Err(SessionError::SequenceExhausted {
                direction: "inbound"
            })
        );
        assert_eq!(
            state.record_outbound(Timestamp::from_millis(10)),
            Err(SessionError::SequenceExhausted {
                direction: "outbound"
            })
        );
        assert_eq!(state.inbound_seq_num(), SeqNum::new(u64::MAX));
        assert_eq!(state.outbound_seq_num(), SeqNum::new(u64::MAX));
        assert_eq!(state.inbound_timestamp(), Timestamp::from_millis(0));
    }

    #[test]
    fn test_recovery_flags() {
        let mut state = state();
        state.begin_synchronizing();
        state.begin_test_request();
        assert!(state.synchronizing());
        assert!(state.test_request_pending());
        state.clear_recovery();
        assert!(!state.synchronizing());
        assert!(!state.test_request_pending());
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::LoggingOn.to_string(), "logging on");
        assert!(Phase::Synchronizing.is_established());
        assert!(!Phase::Terminated.is_established());
    }
}

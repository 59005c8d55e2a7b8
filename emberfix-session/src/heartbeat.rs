/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat and TestRequest timing.
//!
//! This module decides, from the last send and receive times, when a session
//! has to:
//! - Send a Heartbeat (nothing sent for longer than the interval)
//! - Send a TestRequest (nothing received for longer than 1.2x the interval)
//! - Give up on the counterparty (nothing received for longer than 2x the interval)
//!
//! A zero interval disables all three.

use emberfix_core::types::Timestamp;
use std::time::Duration;

/// State of the inbound direction relative to the heartbeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// A message arrived recently enough.
    Fresh,
    /// Silent for longer than 1.2x the interval; probe with a TestRequest.
    Overdue,
    /// Silent for longer than 2x the interval.
    TimedOut {
        /// Time since the last accepted inbound message.
        elapsed: Duration,
    },
}

/// Heartbeat timing for a FIX session.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatTimer {
    interval: Duration,
}

impl HeartbeatTimer {
    /// Creates a timer for the given heartbeat interval.
    ///
    /// # Arguments
    /// * `interval` - The heartbeat interval; zero disables the timer
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns false when the interval is zero.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Checks if a heartbeat should be sent.
    ///
    /// # Arguments
    /// * `last_sent` - Time of the last outbound message
    /// * `now` - Current time
    #[must_use]
    pub fn heartbeat_due(&self, last_sent: Timestamp, now: Timestamp) -> bool {
        self.is_enabled() && now.duration_since(last_sent) > self.interval
    }

    /// Classifies the inbound direction.
    ///
    /// # Arguments
    /// * `last_received` - Time of the last accepted inbound message
    /// * `now` - Current time
    #[must_use]
    pub fn check_inbound(&self, last_received: Timestamp, now: Timestamp) -> Liveness {
        if !self.is_enabled() {
            return Liveness::Fresh;
        }

        let elapsed = now.duration_since(last_received);
        if elapsed > self.interval * 2 {
            Liveness::TimedOut { elapsed }
        } else if elapsed > self.interval * 6 / 5 {
            Liveness::Overdue
        } else {
            Liveness::Fresh
        }
    }
}

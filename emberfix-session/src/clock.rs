/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Time sources.
//!
//! Sessions never read the wall clock directly. Every time comparison goes
//! through the [`Clock`] the session was created with, so tests and
//! simulations can drive a session with [`ManualClock`].

use emberfix_core::types::Timestamp;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of the current time.
pub trait Clock {
    /// Returns the current UTC time.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test keeps one clone and hands another to
/// the session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start.as_nanos())),
        }
    }

    /// Sets the time. Moving backwards is allowed.
    pub fn set(&self, now: Timestamp) {
        self.nanos.store(now.as_nanos(), Ordering::SeqCst);
    }

    /// Moves the time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            })
            .ok();
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(Timestamp::from_millis(1_000));
        let session_side = clock.clone();

        clock.advance(Duration::from_millis(250));
        assert_eq!(session_side.now(), Timestamp::from_millis(1_250));

        clock.set(Timestamp::from_millis(500));
        assert_eq!(session_side.now(), Timestamp::from_millis(500));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a.as_millis() > 0);
    }

    #[test]
    fn test_clock_through_reference() {
        fn read(clock: impl Clock) -> Timestamp {
            clock.now()
        }
        let clock = ManualClock::new(Timestamp::from_millis(42));
        assert_eq!(read(&clock), Timestamp::from_millis(42));
        assert_eq!(read(Arc::new(clock)), Timestamp::from_millis(42));
    }
}

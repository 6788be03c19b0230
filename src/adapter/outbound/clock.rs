//! Clock adapters.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::port::Clock;

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Scenario scripts and tests use it to step across attendance windows.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move forward by `by`. Negative durations are ignored.
    pub fn advance(&self, by: Duration) {
        if by > Duration::zero() {
            *self.now.write() += by;
        }
    }

    /// Move forward by whole minutes.
    pub fn advance_minutes(&self, minutes: u32) {
        self.advance(Duration::minutes(i64::from(minutes)));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_forward_on_advance() {
        let start = Utc::now();
        let clock = ManualClock::new(start);

        clock.advance_minutes(30);
        assert_eq!(clock.now(), start + Duration::minutes(30));

        clock.advance(Duration::minutes(-5));
        assert_eq!(clock.now(), start + Duration::minutes(30));
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

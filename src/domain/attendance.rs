//! Time-boxed attendance sessions.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::error::DomainError;
use super::AccountKey;
use crate::error::LedgerError;

/// A single attendance window.
///
/// Marks are accepted while `now < started_at + window`. Expiry is checked on
/// each incoming call; nothing closes a session in the background.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    window_minutes: u32,
    started_at: DateTime<Utc>,
    attendees: HashSet<AccountKey>,
}

impl AttendanceSession {
    /// Open a session of `window_minutes` starting at `started_at`.
    ///
    /// # Errors
    /// Returns [`DomainError::ZeroWindow`] when `window_minutes` is zero.
    pub fn new(window_minutes: u32, started_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if window_minutes == 0 {
            return Err(DomainError::ZeroWindow);
        }
        Ok(Self {
            window_minutes,
            started_at,
            attendees: HashSet::new(),
        })
    }

    #[must_use]
    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// First instant at which marks are refused.
    #[must_use]
    pub fn closes_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(self.window_minutes))
    }

    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now < self.closes_at()
    }

    #[must_use]
    pub fn has_marked(&self, viewer: &AccountKey) -> bool {
        self.attendees.contains(viewer)
    }

    #[must_use]
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Check whether `viewer` may mark at `now`, without recording anything.
    ///
    /// # Errors
    /// [`LedgerError::WindowExpired`] once the window has elapsed, and
    /// [`LedgerError::AlreadyMarked`] for a repeat mark.
    pub fn check_mark(&self, viewer: &AccountKey, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.is_open_at(now) {
            return Err(LedgerError::WindowExpired {
                closed_at: self.closes_at(),
            });
        }
        if self.has_marked(viewer) {
            return Err(LedgerError::AlreadyMarked {
                viewer: viewer.clone(),
            });
        }
        Ok(())
    }

    /// Record a mark that already passed [`check_mark`](Self::check_mark).
    pub fn record(&mut self, viewer: AccountKey) {
        self.attendees.insert(viewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(
            AttendanceSession::new(0, start()).unwrap_err(),
            DomainError::ZeroWindow
        );
    }

    #[test]
    fn window_is_half_open() {
        let session = AttendanceSession::new(30, start()).unwrap();
        assert!(session.is_open_at(start()));
        assert!(session.is_open_at(start() + Duration::minutes(29)));
        assert!(!session.is_open_at(start() + Duration::minutes(30)));
    }

    #[test]
    fn repeat_mark_is_rejected() {
        let mut session = AttendanceSession::new(30, start()).unwrap();
        let viewer = AccountKey::new("v");
        session.check_mark(&viewer, start()).unwrap();
        session.record(viewer.clone());

        assert_eq!(
            session.check_mark(&viewer, start()),
            Err(LedgerError::AlreadyMarked { viewer })
        );
        assert_eq!(session.attendee_count(), 1);
    }

    #[test]
    fn late_mark_reports_closing_time() {
        let session = AttendanceSession::new(10, start()).unwrap();
        let err = session
            .check_mark(&AccountKey::new("late"), start() + Duration::minutes(11))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::WindowExpired {
                closed_at: start() + Duration::minutes(10)
            }
        );
    }
}

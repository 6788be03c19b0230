//! Attendance session manager.
//!
//! One session at a time. Starting a new session replaces the previous one
//! outright; viewers who marked in the old session can mark again. The
//! session survives a redeploy under a new identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::application::ledger::Ledger;
use crate::domain::{AccountKey, AttendanceSession, ModuleRole, Tokens};
use crate::error::LedgerError;
use crate::port::{AttendanceRewardEvent, AttendanceStartedEvent, Clock, Event, NotifierRegistry};

/// Read-only view of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceSnapshot {
    pub window_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub attendees: usize,
    pub open: bool,
}

/// Rewards viewers once per attendance window.
pub struct AttendanceSystem {
    identity: AccountKey,
    reward: Tokens,
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    session: Arc<Mutex<Option<AttendanceSession>>>,
}

impl AttendanceSystem {
    /// Create the module. It can only pay rewards once the ledger
    /// administrator registers `identity` for [`ModuleRole::Attendance`].
    #[must_use]
    pub fn new(
        identity: AccountKey,
        reward: Tokens,
        ledger: Arc<Ledger>,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self {
            identity,
            reward,
            ledger,
            clock,
            notifiers,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// The same session, rewarded under a new ledger identity.
    #[must_use]
    pub fn with_identity(&self, identity: AccountKey) -> Self {
        Self {
            identity,
            reward: self.reward,
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
            notifiers: Arc::clone(&self.notifiers),
            session: Arc::clone(&self.session),
        }
    }

    /// Identity this module presents to the ledger.
    #[must_use]
    pub fn identity(&self) -> &AccountKey {
        &self.identity
    }

    /// Tokens paid per mark.
    #[must_use]
    pub fn reward(&self) -> Tokens {
        self.reward
    }

    /// Open a new window of `window_minutes`, replacing any prior session.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] for anyone but the administrator and
    /// [`LedgerError::Invalid`] for a zero-length window.
    pub fn start_new_attendance(
        &self,
        caller: &AccountKey,
        window_minutes: u32,
    ) -> Result<AttendanceSnapshot, LedgerError> {
        self.ledger
            .require_administrator(caller, "start attendance sessions")?;

        let session = AttendanceSession::new(window_minutes, self.clock.now())?;
        let event = AttendanceStartedEvent {
            window_minutes,
            started_at: session.started_at(),
            closes_at: session.closes_at(),
        };
        let snapshot = snapshot(&session, session.started_at());
        *self.session.lock() = Some(session);

        info!(
            window_minutes,
            closes_at = %event.closes_at,
            "Attendance session started"
        );
        self.notifiers.notify_all(Event::AttendanceStarted(event));
        Ok(snapshot)
    }

    /// Record `viewer`'s attendance and pay the reward. Returns the viewer's
    /// new balance.
    ///
    /// # Errors
    /// [`LedgerError::NoActiveSession`] before the first session,
    /// [`LedgerError::WindowExpired`] after the window,
    /// [`LedgerError::AlreadyMarked`] on a repeat, and any ledger rejection
    /// (e.g. this module's registration was superseded).
    pub fn mark_my_attendance(&self, viewer: &AccountKey) -> Result<Tokens, LedgerError> {
        let now = self.clock.now();
        let balance_after = {
            let mut guard = self.session.lock();
            let session = guard.as_mut().ok_or(LedgerError::NoActiveSession)?;
            if let Err(err) = session.check_mark(viewer, now) {
                debug!(viewer = %viewer, error = %err, "Attendance mark rejected");
                return Err(err);
            }

            // Credit first: a rejected credit must leave the session untouched.
            let balance_after =
                self.ledger
                    .credit(&self.identity, ModuleRole::Attendance, viewer, self.reward)?;
            session.record(viewer.clone());
            balance_after
        };

        info!(viewer = %viewer, reward = self.reward, "Attendance rewarded");
        self.notifiers
            .notify_all(Event::AttendanceRewarded(AttendanceRewardEvent {
                viewer: viewer.clone(),
                reward: self.reward,
                balance_after,
            }));
        Ok(balance_after)
    }

    /// Whether `viewer` has marked in the current session.
    #[must_use]
    pub fn has_marked(&self, viewer: &AccountKey) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| session.has_marked(viewer))
    }

    /// Current session, for display.
    #[must_use]
    pub fn current_session(&self) -> Option<AttendanceSnapshot> {
        let now = self.clock.now();
        self.session
            .lock()
            .as_ref()
            .map(|session| snapshot(session, now))
    }
}

fn snapshot(session: &AttendanceSession, now: DateTime<Utc>) -> AttendanceSnapshot {
    AttendanceSnapshot {
        window_minutes: session.window_minutes(),
        started_at: session.started_at(),
        closes_at: session.closes_at(),
        attendees: session.attendee_count(),
        open: session.is_open_at(now),
    }
}

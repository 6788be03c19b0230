//! Time source port.
//!
//! Attendance windows and bet timestamps read the current time through this
//! trait so the scenario runner and tests can drive time explicitly.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated
//! at construction time, before anything touches the ledger.
//!
//! # Examples
//!
//! ```
//! use streamledger::domain::error::DomainError;
//! use streamledger::domain::AttendanceSession;
//!
//! let result = AttendanceSession::new(0, chrono::Utc::now());
//! assert!(matches!(result, Err(DomainError::ZeroWindow)));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A prediction market needs at least two options to be a bet.
    #[error("a market needs at least 2 options, got {option_count}")]
    OptionCountTooSmall {
        /// The option count that was provided.
        option_count: usize,
    },

    /// Attendance windows must last at least one minute.
    #[error("attendance window must be at least one minute")]
    ZeroWindow,

    /// Markets must carry a label viewers can read.
    #[error("market label cannot be empty")]
    EmptyLabel,

    /// Interactions must describe what the streamer will do.
    #[error("interaction description cannot be empty")]
    EmptyDescription,

    /// Each bet escrows a positive stake.
    #[error("stake must be positive")]
    ZeroStake,
}

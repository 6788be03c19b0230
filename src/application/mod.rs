//! Application services (use cases).
//!
//! These services drive the domain state machines and apply every balance
//! change through the shared [`Ledger`].

pub mod attendance;
pub mod channel;
pub mod interaction;
pub mod ledger;
pub mod prediction;

pub use attendance::{AttendanceSnapshot, AttendanceSystem};
pub use channel::{Channel, ChannelSettings};
pub use interaction::InteractionSystem;
pub use ledger::Ledger;
pub use prediction::{MarketSnapshot, PredictionSystem};

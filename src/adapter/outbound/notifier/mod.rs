//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the backends the binary uses.

mod journal;
mod log;

pub use journal::EventJournal;
pub use log::LogNotifier;

use crate::port::{Event, Notifier};

/// A no-op notifier.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

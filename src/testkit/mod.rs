//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`config`]: Canonical channel settings and config snippets.
//! - [`notifier`]: `RecordingNotifier` and balance replay from events.
//! - [`fixtures`]: `TestChannel`, a deployed channel on a manual clock.

pub mod config;
pub mod fixtures;
pub mod notifier;

pub use crate::adapter::outbound::clock::ManualClock;
pub use fixtures::{viewer, TestChannel};
pub use notifier::RecordingNotifier;

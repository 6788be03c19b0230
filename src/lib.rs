//! Streamledger - a viewer-engagement token economy for live streams.
//!
//! A streamer runs one [`Ledger`](application::Ledger) of viewer balances.
//! Modules registered with the ledger move tokens on the streamer's behalf:
//!
//! - **Attendance** - rewards each viewer once per timed session
//! - **Prediction** - creates markets, escrows stakes, pays winners equally
//! - **Interaction** - donations, subscriptions and paid interaction requests
//!
//! # Architecture
//!
//! - [`domain`] - Identifiers, session and market state machines, payouts
//! - [`port`] - Traits the application depends on (clock, notifier)
//! - [`application`] - Ledger and module services, channel deployment
//! - [`adapter`] - CLI, clocks, notifiers
//! - [`infrastructure`] - Configuration and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use streamledger::adapter::outbound::clock::SystemClock;
//! use streamledger::application::{Channel, ChannelSettings};
//! use streamledger::domain::AccountKey;
//! use streamledger::port::NotifierRegistry;
//!
//! let settings = ChannelSettings {
//!     administrator: AccountKey::new("streamer"),
//!     attendance_module: AccountKey::new("module:attendance"),
//!     prediction_module: AccountKey::new("module:prediction"),
//!     interaction_module: AccountKey::new("module:interaction"),
//!     attendance_reward: 10,
//!     prediction_stake: 1,
//!     subscription_price: 5,
//!     tokens_per_donation_unit: 0,
//! };
//! let channel = Channel::deploy(
//!     &settings,
//!     Arc::new(SystemClock),
//!     Arc::new(NotifierRegistry::new()),
//! )
//! .unwrap();
//!
//! let admin = AccountKey::new("streamer");
//! let alice = AccountKey::new("alice");
//! channel.attendance().start_new_attendance(&admin, 30).unwrap();
//! assert_eq!(channel.attendance().mark_my_attendance(&alice).unwrap(), 10);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

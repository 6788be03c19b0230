//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Notifier`] - Event notifications (logging, test recorders, ...)
//! - [`Clock`] - Wall-clock time for attendance windows and timestamps

pub mod outbound;

pub use outbound::clock::Clock;
pub use outbound::notifier::{
    AttendanceRewardEvent, AttendanceStartedEvent, BalanceEvent, BetEvent, DonationEvent, Event,
    InteractionAddedEvent, MarketCreatedEvent, ModuleEvent, Notifier, NotifierRegistry,
    RequestEvent, ResolutionEvent, SubscriptionEvent,
};

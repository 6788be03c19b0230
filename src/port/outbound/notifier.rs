//! Notifier port for ledger events.
//!
//! Every accepted mutation is published as an [`Event`]. The balance events
//! carry a sequence number and the balance after the change, so an observer
//! can rebuild every account from the stream alone without reading state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AccountKey, InteractionId, MarketId, ModuleRole, RequestId, Tokens};

/// Events published by the ledger and its modules.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A module identity was (re)registered for a role.
    ModuleRegistered(ModuleEvent),
    /// Tokens were added to an account.
    Credited(BalanceEvent),
    /// Tokens were removed from an account.
    Debited(BalanceEvent),
    /// A new attendance window opened.
    AttendanceStarted(AttendanceStartedEvent),
    /// A viewer was paid for attending.
    AttendanceRewarded(AttendanceRewardEvent),
    /// A new prediction market became current.
    MarketCreated(MarketCreatedEvent),
    /// A stake was escrowed on an option.
    BetPlaced(BetEvent),
    /// A market stopped accepting bets.
    BettingClosed {
        /// The market that closed.
        market_id: MarketId,
    },
    /// A market was resolved and its pool paid out.
    MarketResolved(ResolutionEvent),
    /// A direct payment was recorded.
    DonationReceived(DonationEvent),
    /// A subscription payment was recorded.
    Subscribed(SubscriptionEvent),
    /// The streamer offered a new interaction.
    InteractionAdded(InteractionAddedEvent),
    /// A viewer paid for an interaction.
    InteractionRequested(RequestEvent),
    /// The streamer performed a requested interaction.
    RequestFulfilled(RequestEvent),
    /// The streamer declined a request and refunded it.
    RequestRefunded(RequestEvent),
}

/// Module registration event.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleEvent {
    pub role: ModuleRole,
    pub identity: AccountKey,
    /// Identity that held the role before, now rejected.
    pub previous: Option<AccountKey>,
}

/// Ledger balance delta.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceEvent {
    /// Monotonic per-ledger sequence, starting at 1.
    pub sequence: u64,
    /// Role of the module that requested the change.
    pub role: ModuleRole,
    pub account: AccountKey,
    pub amount: Tokens,
    pub balance_after: Tokens,
}

/// Attendance window opening.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStartedEvent {
    pub window_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

/// Attendance reward credited.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRewardEvent {
    pub viewer: AccountKey,
    pub reward: Tokens,
    pub balance_after: Tokens,
}

/// Market creation.
#[derive(Debug, Clone, Serialize)]
pub struct MarketCreatedEvent {
    pub market_id: MarketId,
    pub label: String,
    pub option_count: usize,
    pub stake: Tokens,
}

/// Bet placement.
#[derive(Debug, Clone, Serialize)]
pub struct BetEvent {
    pub market_id: MarketId,
    pub viewer: AccountKey,
    pub option: usize,
    pub stake: Tokens,
    /// Pool size including this bet.
    pub pool: Tokens,
}

/// Market resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionEvent {
    pub market_id: MarketId,
    pub winning_option: usize,
    pub pool: Tokens,
    /// Sum credited to winners.
    pub payout_total: Tokens,
    pub share: Tokens,
    /// Remainder or forfeited pool that nobody received.
    pub retained: Tokens,
    pub payouts: Vec<(AccountKey, Tokens)>,
}

/// Direct payment.
#[derive(Debug, Clone, Serialize)]
pub struct DonationEvent {
    pub viewer: AccountKey,
    pub amount: u64,
    pub total_donated: u64,
    /// Tokens credited in return, zero when the bonus rate is zero.
    pub bonus_tokens: Tokens,
}

/// Subscription payment.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionEvent {
    pub viewer: AccountKey,
    pub amount: u64,
}

/// Catalog addition.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionAddedEvent {
    pub interaction_id: InteractionId,
    pub cost: Tokens,
    pub description: String,
}

/// Request lifecycle change.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEvent {
    pub request_id: RequestId,
    pub interaction_id: InteractionId,
    pub viewer: AccountKey,
    pub cost: Tokens,
}

/// Trait for notification handlers.
///
/// Implementations must be thread-safe and return quickly; they are called
/// after the mutation has committed and all locks are released.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Publish a batch in order.
    pub fn notify_each(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.notify_all(event);
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

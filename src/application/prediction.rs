//! Prediction market factory and router.
//!
//! Markets live in a registry keyed by [`MarketId`]. The "current" market is a
//! single pointer into that registry: creating a market moves the pointer,
//! but older markets stay addressable and can still be closed and resolved
//! through the `*_market` variants.
//!
//! Each market sits behind its own lock, held for the whole operation
//! including the ledger transfer. Bets on different markets do not contend.
//!
//! The registry lives in a `MarketBook` shared by every deployment of the
//! module, so a redeploy under a new identity keeps escrowed markets
//! resolvable.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::application::ledger::Ledger;
use crate::domain::{
    AccountKey, MarketId, MarketStatus, ModuleRole, PredictionMarket, Settlement, Tokens,
};
use crate::error::LedgerError;
use crate::port::{BetEvent, Clock, Event, MarketCreatedEvent, NotifierRegistry, ResolutionEvent};

/// Read-only view of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSnapshot {
    pub id: MarketId,
    pub label: String,
    pub status: MarketStatus,
    pub option_count: usize,
    pub stake: Tokens,
    /// Bettors per option.
    pub bettors: Vec<usize>,
    pub pool: Tokens,
    pub winning_option: Option<usize>,
    pub current: bool,
}

/// Markets and payout totals, independent of the module identity.
#[derive(Default)]
struct MarketBook {
    markets: DashMap<MarketId, Arc<Mutex<PredictionMarket>>>,
    current: RwLock<Option<MarketId>>,
    /// Last issued id; only advanced once a market is valid.
    last_id: Mutex<u64>,
    retained: Mutex<Tokens>,
}

/// Creates markets, tracks the current one, escrows stakes and pays winners.
pub struct PredictionSystem {
    identity: AccountKey,
    stake: Tokens,
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    book: Arc<MarketBook>,
}

impl PredictionSystem {
    /// Create the factory. New markets escrow `stake` tokens per bet.
    #[must_use]
    pub fn new(
        identity: AccountKey,
        stake: Tokens,
        ledger: Arc<Ledger>,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self {
            identity,
            stake,
            ledger,
            clock,
            notifiers,
            book: Arc::new(MarketBook::default()),
        }
    }

    /// The same markets, served under a new ledger identity.
    ///
    /// Open and closed markets keep their escrow and can be resolved by the
    /// returned system once `identity` is registered for the role.
    #[must_use]
    pub fn with_identity(&self, identity: AccountKey) -> Self {
        Self {
            identity,
            stake: self.stake,
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
            notifiers: Arc::clone(&self.notifiers),
            book: Arc::clone(&self.book),
        }
    }

    /// Identity this module presents to the ledger.
    #[must_use]
    pub fn identity(&self) -> &AccountKey {
        &self.identity
    }

    /// Create a market with `option_count` options and make it current.
    ///
    /// The previous current market, resolved or not, stays in the registry.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] for non-administrators and
    /// [`LedgerError::Invalid`] for fewer than two options or a blank label.
    pub fn create_prediction(
        &self,
        caller: &AccountKey,
        label: &str,
        option_count: usize,
    ) -> Result<MarketId, LedgerError> {
        self.ledger
            .require_administrator(caller, "create prediction markets")?;

        let (id, previous) = {
            let mut last_id = self.book.last_id.lock();
            let id = MarketId::new(*last_id + 1);
            let market =
                PredictionMarket::new(id, label, option_count, self.stake, self.clock.now())?;
            *last_id += 1;

            self.book.markets.insert(id, Arc::new(Mutex::new(market)));
            (id, self.book.current.write().replace(id))
        };

        info!(
            market_id = %id,
            label,
            option_count,
            stake = self.stake,
            previous = ?previous,
            "Prediction market created"
        );
        self.notifiers
            .notify_all(Event::MarketCreated(MarketCreatedEvent {
                market_id: id,
                label: label.to_string(),
                option_count,
                stake: self.stake,
            }));
        Ok(id)
    }

    /// The live market, if any has been created.
    #[must_use]
    pub fn current_prediction(&self) -> Option<MarketId> {
        *self.book.current.read()
    }

    fn current_id(&self) -> Result<MarketId, LedgerError> {
        self.current_prediction().ok_or(LedgerError::NoActiveMarket)
    }

    fn market(&self, id: MarketId) -> Result<Arc<Mutex<PredictionMarket>>, LedgerError> {
        self.book
            .markets
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::UnknownMarket(id))
    }

    /// Bet on `option` in the current market.
    ///
    /// # Errors
    /// [`LedgerError::NoActiveMarket`] when no market exists, otherwise as
    /// [`bet_on_market`](Self::bet_on_market).
    pub fn bet_on_option(&self, viewer: &AccountKey, option: usize) -> Result<Tokens, LedgerError> {
        let id = self.current_id()?;
        self.bet_on_market(viewer, id, option)
    }

    /// Bet on `option` in market `id`, escrowing the stake from the viewer's
    /// balance. Returns the pool after the bet.
    ///
    /// # Errors
    /// Market rejections ([`LedgerError::MarketClosed`],
    /// [`LedgerError::InvalidState`], [`LedgerError::OutOfRange`],
    /// [`LedgerError::DuplicateBet`], [`LedgerError::PoolOverflow`]) and
    /// ledger rejections
    /// ([`LedgerError::InsufficientBalance`], [`LedgerError::Unauthorized`]).
    pub fn bet_on_market(
        &self,
        viewer: &AccountKey,
        id: MarketId,
        option: usize,
    ) -> Result<Tokens, LedgerError> {
        let market = self.market(id)?;
        let (stake, pool) = {
            let mut market = market.lock();
            if let Err(err) = market.check_bet(viewer, option) {
                debug!(market_id = %id, viewer = %viewer, error = %err, "Bet rejected");
                return Err(err);
            }

            let stake = market.stake();
            self.ledger
                .debit(&self.identity, ModuleRole::PredictionSystem, viewer, stake)?;
            market.record_bet(viewer.clone(), option, self.clock.now());
            (stake, market.pool())
        };

        info!(market_id = %id, viewer = %viewer, option, stake, pool, "Bet placed");
        self.notifiers.notify_all(Event::BetPlaced(BetEvent {
            market_id: id,
            viewer: viewer.clone(),
            option,
            stake,
            pool,
        }));
        Ok(pool)
    }

    /// Close betting on the current market.
    ///
    /// # Errors
    /// [`LedgerError::NoActiveMarket`], otherwise as
    /// [`close_market`](Self::close_market).
    pub fn close_betting(&self, caller: &AccountKey) -> Result<MarketId, LedgerError> {
        let id = self.current_id()?;
        self.close_market(caller, id)?;
        Ok(id)
    }

    /// Close betting on market `id`.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] for non-administrators and
    /// [`LedgerError::InvalidState`] unless the market is open.
    pub fn close_market(&self, caller: &AccountKey, id: MarketId) -> Result<(), LedgerError> {
        self.ledger
            .require_administrator(caller, "close prediction markets")?;
        let market = self.market(id)?;
        market.lock().close()?;

        info!(market_id = %id, "Betting closed");
        self.notifiers
            .notify_all(Event::BettingClosed { market_id: id });
        Ok(())
    }

    /// Resolve the current market with `winning_option`.
    ///
    /// # Errors
    /// [`LedgerError::NoActiveMarket`] when no market exists, otherwise as
    /// [`unravel_market`](Self::unravel_market).
    pub fn unravel_results(
        &self,
        caller: &AccountKey,
        winning_option: usize,
    ) -> Result<Settlement, LedgerError> {
        let id = self.current_id()?;
        self.unravel_market(caller, id, winning_option)
    }

    /// Resolve market `id` and pay every winner `floor(pool / winners)`.
    ///
    /// Winners are paid in one ledger batch, so either all of them are
    /// credited and the market becomes Resolved, or nothing changes.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`], [`LedgerError::AlreadyResolved`],
    /// [`LedgerError::OutOfRange`], [`LedgerError::BalanceOverflow`] when
    /// the retained total would overflow, and ledger rejections.
    pub fn unravel_market(
        &self,
        caller: &AccountKey,
        id: MarketId,
        winning_option: usize,
    ) -> Result<Settlement, LedgerError> {
        self.ledger
            .require_administrator(caller, "resolve prediction markets")?;
        let market = self.market(id)?;

        let settlement = {
            let mut market = market.lock();
            let settlement = market.settle(winning_option)?;

            let mut retained = self.book.retained.lock();
            let total_retained = retained.checked_add(settlement.retained).ok_or_else(|| {
                LedgerError::BalanceOverflow {
                    account: self.identity.clone(),
                }
            })?;
            self.ledger.credit_many(
                &self.identity,
                ModuleRole::PredictionSystem,
                &settlement.payouts,
            )?;
            market.resolve(settlement.clone());
            *retained = total_retained;
            settlement
        };

        info!(
            market_id = %id,
            winning_option,
            pool = settlement.pool,
            winners = settlement.payouts.len(),
            share = settlement.share,
            retained = settlement.retained,
            "Market resolved"
        );
        self.notifiers
            .notify_all(Event::MarketResolved(ResolutionEvent {
                market_id: id,
                winning_option,
                pool: settlement.pool,
                payout_total: settlement.distributed(),
                share: settlement.share,
                retained: settlement.retained,
                payouts: settlement.payouts.clone(),
            }));
        Ok(settlement)
    }

    /// Snapshot of market `id`.
    #[must_use]
    pub fn snapshot(&self, id: MarketId) -> Option<MarketSnapshot> {
        let current = self.current_prediction();
        let market = self
            .book
            .markets
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))?;
        let market = market.lock();
        Some(MarketSnapshot {
            id,
            label: market.label().to_string(),
            status: market.status(),
            option_count: market.option_count(),
            stake: market.stake(),
            bettors: market.bettor_counts(),
            pool: market.pool(),
            winning_option: market.winning_option(),
            current: current == Some(id),
        })
    }

    /// Snapshots of every market, oldest first.
    #[must_use]
    pub fn markets(&self) -> Vec<MarketSnapshot> {
        let mut ids: Vec<MarketId> = self.book.markets.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids.into_iter().filter_map(|id| self.snapshot(id)).collect()
    }

    /// Option `viewer` backed in market `id`.
    #[must_use]
    pub fn bet_of(&self, id: MarketId, viewer: &AccountKey) -> Option<usize> {
        let market = self
            .book
            .markets
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))?;
        let option = market.lock().bet_of(viewer);
        option
    }

    /// Tokens escrowed but never paid out across all resolved markets.
    #[must_use]
    pub fn retained(&self) -> Tokens {
        *self.book.retained.lock()
    }
}

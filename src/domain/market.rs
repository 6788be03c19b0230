//! Prediction market domain types.
//!
//! - [`PredictionMarket`] - A fixed-option betting round with an
//!   Open → Closed → Resolved lifecycle
//! - [`MarketStatus`] - Lifecycle state
//! - [`Bet`] - A single escrowed bet
//!
//! The market itself never holds balances. It decides whether a bet or a
//! resolution is admissible and computes the [`Settlement`]; the prediction
//! system moves the tokens through the ledger.
//!
//! # Example
//!
//! ```
//! use streamledger::domain::{MarketId, PredictionMarket};
//!
//! let market = PredictionMarket::new(
//!     MarketId::new(1),
//!     "Will the boss fall on the first try?",
//!     3,
//!     1,
//!     chrono::Utc::now(),
//! )
//! .unwrap();
//! assert_eq!(market.option_count(), 3);
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;
use super::payout::{self, Settlement};
use super::{AccountKey, MarketId, Tokens};
use crate::error::LedgerError;

/// Market lifecycle status. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Accepting bets.
    Open,
    /// Betting ended, awaiting resolution.
    Closed,
    /// Winning option declared and payouts distributed.
    Resolved,
}

impl MarketStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single escrowed bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bet {
    pub bettor: AccountKey,
    pub option: usize,
    pub stake: Tokens,
    pub placed_at: DateTime<Utc>,
}

/// A fixed-option betting round.
#[derive(Debug, Clone)]
pub struct PredictionMarket {
    id: MarketId,
    label: String,
    option_count: usize,
    stake: Tokens,
    created_at: DateTime<Utc>,
    status: MarketStatus,
    bets: Vec<Bet>,
    pool: Tokens,
    by_bettor: HashMap<AccountKey, usize>,
    settlement: Option<Settlement>,
}

impl PredictionMarket {
    /// Create an open market.
    ///
    /// # Errors
    /// Fails when the label is blank, fewer than two options are given, or
    /// the stake is zero.
    pub fn new(
        id: MarketId,
        label: impl Into<String>,
        option_count: usize,
        stake: Tokens,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::EmptyLabel);
        }
        if option_count < 2 {
            return Err(DomainError::OptionCountTooSmall { option_count });
        }
        if stake == 0 {
            return Err(DomainError::ZeroStake);
        }

        Ok(Self {
            id,
            label,
            option_count,
            stake,
            created_at,
            status: MarketStatus::Open,
            bets: Vec::new(),
            pool: 0,
            by_bettor: HashMap::new(),
            settlement: None,
        })
    }

    #[must_use]
    pub const fn id(&self) -> MarketId {
        self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn option_count(&self) -> usize {
        self.option_count
    }

    /// Tokens escrowed by every bet in this market.
    #[must_use]
    pub const fn stake(&self) -> Tokens {
        self.stake
    }

    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Option chosen by `viewer`, if they bet.
    #[must_use]
    pub fn bet_of(&self, viewer: &AccountKey) -> Option<usize> {
        self.by_bettor.get(viewer).copied()
    }

    /// Number of bettors on each option, indexed by option.
    #[must_use]
    pub fn bettor_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.option_count];
        for bet in &self.bets {
            counts[bet.option] += 1;
        }
        counts
    }

    /// Bettors on `option`, in betting order.
    #[must_use]
    pub fn bettors_on(&self, option: usize) -> Vec<AccountKey> {
        self.bets
            .iter()
            .filter(|bet| bet.option == option)
            .map(|bet| bet.bettor.clone())
            .collect()
    }

    /// Sum of every stake placed so far.
    #[must_use]
    pub const fn pool(&self) -> Tokens {
        self.pool
    }

    #[must_use]
    pub fn winning_option(&self) -> Option<usize> {
        self.settlement.as_ref().map(|s| s.winning_option)
    }

    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    fn check_option(&self, index: usize) -> Result<(), LedgerError> {
        if index >= self.option_count {
            return Err(LedgerError::OutOfRange {
                index,
                option_count: self.option_count,
            });
        }
        Ok(())
    }

    /// Check whether `bettor` may bet on `option` right now.
    ///
    /// Duplicate policy: one bet per viewer per market. A second bet is
    /// refused whether it names the same option or a different one.
    ///
    /// # Errors
    /// [`LedgerError::MarketClosed`] once betting is closed,
    /// [`LedgerError::InvalidState`] once resolved,
    /// [`LedgerError::OutOfRange`] for an unknown option,
    /// [`LedgerError::DuplicateBet`] for a second bet and
    /// [`LedgerError::PoolOverflow`] when one more stake would not fit.
    pub fn check_bet(&self, bettor: &AccountKey, option: usize) -> Result<(), LedgerError> {
        match self.status {
            MarketStatus::Open => {}
            MarketStatus::Closed => {
                return Err(LedgerError::MarketClosed { market_id: self.id });
            }
            MarketStatus::Resolved => {
                return Err(LedgerError::InvalidState {
                    market_id: self.id,
                    status: self.status,
                });
            }
        }
        self.check_option(option)?;
        if let Some(existing) = self.bet_of(bettor) {
            return Err(LedgerError::DuplicateBet {
                market_id: self.id,
                viewer: bettor.clone(),
                option: existing,
            });
        }
        if self.pool.checked_add(self.stake).is_none() {
            return Err(LedgerError::PoolOverflow { market_id: self.id });
        }
        Ok(())
    }

    /// Record a bet that passed [`check_bet`](Self::check_bet) and whose
    /// stake has been escrowed.
    pub fn record_bet(&mut self, bettor: AccountKey, option: usize, placed_at: DateTime<Utc>) {
        self.pool = self.pool.saturating_add(self.stake);
        self.by_bettor.insert(bettor.clone(), option);
        self.bets.push(Bet {
            bettor,
            option,
            stake: self.stake,
            placed_at,
        });
    }

    /// Stop accepting bets.
    ///
    /// # Errors
    /// [`LedgerError::InvalidState`] unless the market is open.
    pub fn close(&mut self) -> Result<(), LedgerError> {
        if self.status != MarketStatus::Open {
            return Err(LedgerError::InvalidState {
                market_id: self.id,
                status: self.status,
            });
        }
        self.status = MarketStatus::Closed;
        Ok(())
    }

    /// Compute the settlement for `winning_option` without applying it.
    ///
    /// Resolution is allowed from Open as well as Closed; resolving an open
    /// market closes it in the same step.
    ///
    /// # Errors
    /// [`LedgerError::AlreadyResolved`] after resolution and
    /// [`LedgerError::OutOfRange`] for an unknown option.
    pub fn settle(&self, winning_option: usize) -> Result<Settlement, LedgerError> {
        if self.status == MarketStatus::Resolved {
            return Err(LedgerError::AlreadyResolved { market_id: self.id });
        }
        self.check_option(winning_option)?;

        let winners = self.bettors_on(winning_option);
        Ok(payout::split(winning_option, self.pool(), &winners))
    }

    /// Mark the market resolved once the settlement has been paid out.
    pub fn resolve(&mut self, settlement: Settlement) {
        self.status = MarketStatus::Resolved;
        self.settlement = Some(settlement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(options: usize) -> PredictionMarket {
        PredictionMarket::new(
            MarketId::new(1),
            "Next map?",
            options,
            1,
            Utc::now(),
        )
        .unwrap()
    }

    fn bet(market: &mut PredictionMarket, who: &str, option: usize) {
        let key = AccountKey::new(who);
        market.check_bet(&key, option).unwrap();
        market.record_bet(key, option, Utc::now());
    }

    #[test]
    fn construction_validates_inputs() {
        assert_eq!(
            PredictionMarket::new(MarketId::new(1), "x", 1, 1, Utc::now()).unwrap_err(),
            DomainError::OptionCountTooSmall { option_count: 1 }
        );
        assert_eq!(
            PredictionMarket::new(MarketId::new(1), "  ", 2, 1, Utc::now()).unwrap_err(),
            DomainError::EmptyLabel
        );
        assert_eq!(
            PredictionMarket::new(MarketId::new(1), "x", 2, 0, Utc::now()).unwrap_err(),
            DomainError::ZeroStake
        );
    }

    #[test]
    fn option_index_must_be_in_range() {
        let m = market(3);
        let v = AccountKey::new("v");
        for option in 0..3 {
            assert!(m.check_bet(&v, option).is_ok());
        }
        assert_eq!(
            m.check_bet(&v, 3),
            Err(LedgerError::OutOfRange {
                index: 3,
                option_count: 3
            })
        );
    }

    #[test]
    fn second_bet_on_same_option_is_rejected() {
        let mut m = market(3);
        bet(&mut m, "v", 1);
        assert!(matches!(
            m.check_bet(&AccountKey::new("v"), 1),
            Err(LedgerError::DuplicateBet { option: 1, .. })
        ));
    }

    #[test]
    fn second_bet_on_other_option_is_rejected_and_keeps_first() {
        let mut m = market(3);
        bet(&mut m, "v", 1);
        assert!(matches!(
            m.check_bet(&AccountKey::new("v"), 2),
            Err(LedgerError::DuplicateBet { option: 1, .. })
        ));
        assert_eq!(m.bet_of(&AccountKey::new("v")), Some(1));
        assert_eq!(m.bettor_counts(), vec![0, 1, 0]);
    }

    #[test]
    fn closed_market_refuses_bets_and_second_close() {
        let mut m = market(2);
        m.close().unwrap();
        assert_eq!(
            m.check_bet(&AccountKey::new("v"), 0),
            Err(LedgerError::MarketClosed {
                market_id: MarketId::new(1)
            })
        );
        assert!(matches!(m.close(), Err(LedgerError::InvalidState { .. })));
    }

    #[test]
    fn settle_splits_pool_between_winners() {
        let mut m = market(3);
        bet(&mut m, "a", 1);
        bet(&mut m, "b", 1);
        bet(&mut m, "c", 0);

        let settlement = m.settle(1).unwrap();
        assert_eq!(settlement.pool, 3);
        assert_eq!(settlement.share, 1);
        assert_eq!(settlement.retained, 1);
    }

    #[test]
    fn resolved_market_rejects_everything() {
        let mut m = market(2);
        bet(&mut m, "a", 0);
        let settlement = m.settle(0).unwrap();
        m.resolve(settlement);

        assert_eq!(m.status(), MarketStatus::Resolved);
        assert_eq!(m.winning_option(), Some(0));
        assert_eq!(
            m.settle(0),
            Err(LedgerError::AlreadyResolved {
                market_id: MarketId::new(1)
            })
        );
        assert!(matches!(
            m.check_bet(&AccountKey::new("z"), 1),
            Err(LedgerError::InvalidState {
                status: MarketStatus::Resolved,
                ..
            })
        ));
        assert!(matches!(m.close(), Err(LedgerError::InvalidState { .. })));
    }

    #[test]
    fn bet_that_would_overflow_pool_is_rejected() {
        let mut m = PredictionMarket::new(MarketId::new(4), "Big stakes", 2, 1 << 63, Utc::now())
            .unwrap();
        bet(&mut m, "a", 0);

        assert_eq!(
            m.check_bet(&AccountKey::new("b"), 1),
            Err(LedgerError::PoolOverflow {
                market_id: MarketId::new(4)
            })
        );
        assert_eq!(m.pool(), 1 << 63);
        assert_eq!(m.bettor_counts(), vec![1, 0]);
    }
}

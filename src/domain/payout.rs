//! Pool splitting for resolved prediction markets.
//!
//! Every winner receives `floor(pool / winners)`. Whatever the division leaves
//! over, or the whole pool when nobody picked the winning option, is retained
//! and never distributed.

use serde::Serialize;

use super::{AccountKey, Tokens};

/// Outcome of splitting a pool between the winners of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// Option declared as the winner.
    pub winning_option: usize,
    /// Sum of every stake placed in the market.
    pub pool: Tokens,
    /// Amount credited to each winner.
    pub share: Tokens,
    /// One entry per winning bettor, in betting order.
    pub payouts: Vec<(AccountKey, Tokens)>,
    /// Tokens kept back: the division remainder or a forfeited pool.
    pub retained: Tokens,
}

impl Settlement {
    /// Total credited to winners.
    #[must_use]
    pub fn distributed(&self) -> Tokens {
        self.share * self.payouts.len() as Tokens
    }

    /// True when nobody backed the winning option.
    #[must_use]
    pub fn is_forfeit(&self) -> bool {
        self.payouts.is_empty()
    }
}

/// Split `pool` evenly between `winners`.
#[must_use]
pub fn split(winning_option: usize, pool: Tokens, winners: &[AccountKey]) -> Settlement {
    if winners.is_empty() {
        return Settlement {
            winning_option,
            pool,
            share: 0,
            payouts: Vec::new(),
            retained: pool,
        };
    }

    let count = winners.len() as Tokens;
    let share = pool / count;
    let payouts = winners
        .iter()
        .map(|winner| (winner.clone(), share))
        .collect();

    Settlement {
        winning_option,
        pool,
        share,
        payouts,
        retained: pool - share * count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<AccountKey> {
        names.iter().map(|n| AccountKey::new(*n)).collect()
    }

    #[test]
    fn uneven_pool_truncates_and_retains_remainder() {
        let settlement = split(1, 3, &keys(&["a", "b"]));

        assert_eq!(settlement.share, 1);
        assert_eq!(settlement.distributed(), 2);
        assert_eq!(settlement.retained, 1);
        assert_eq!(
            settlement.payouts,
            vec![(AccountKey::new("a"), 1), (AccountKey::new("b"), 1)]
        );
    }

    #[test]
    fn sole_winner_takes_whole_pool() {
        let settlement = split(0, 7, &keys(&["v"]));
        assert_eq!(settlement.share, 7);
        assert_eq!(settlement.retained, 0);
    }

    #[test]
    fn no_winners_forfeits_pool() {
        let settlement = split(2, 5, &[]);
        assert!(settlement.is_forfeit());
        assert_eq!(settlement.distributed(), 0);
        assert_eq!(settlement.retained, 5);
    }

    #[test]
    fn more_winners_than_tokens_pays_nothing() {
        let settlement = split(0, 2, &keys(&["a", "b", "c"]));
        assert_eq!(settlement.share, 0);
        assert_eq!(settlement.retained, 2);
        assert_eq!(settlement.payouts.len(), 3);
    }
}

#![allow(dead_code)]

use streamledger::domain::{AccountKey, MarketId, Tokens};
use streamledger::testkit::{viewer, TestChannel};

/// Every balance plus the current market's bettor counts, for "nothing
/// changed" assertions after a rejected call.
pub fn state_of(test: &TestChannel) -> (Vec<(AccountKey, Tokens)>, Vec<Vec<usize>>) {
    let markets = test
        .prediction()
        .markets()
        .into_iter()
        .map(|market| market.bettors)
        .collect();
    (test.ledger().accounts(), markets)
}

/// A funded channel with an open 3-option market and viewers `a`, `b`, `c`
/// holding one attendance reward each.
pub fn market_with_viewers() -> (TestChannel, MarketId, [AccountKey; 3]) {
    let test = TestChannel::deploy();
    let viewers = [viewer("a"), viewer("b"), viewer("c")];
    test.fund(&[&viewers[0], &viewers[1], &viewers[2]], 1);
    let id = test
        .prediction()
        .create_prediction(&test.admin(), "Who wins?", 3)
        .expect("create market");
    (test, id, viewers)
}

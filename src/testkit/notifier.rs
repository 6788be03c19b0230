//! Event recording for assertions.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{AccountKey, Tokens};
use crate::port::{BalanceEvent, Event, Notifier};

/// Thread-safe event collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Credit and debit events, in order.
    pub fn balance_events(&self) -> Vec<BalanceEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Credited(e) | Event::Debited(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rebuild every balance from credit/debit events alone.
    pub fn replay_balances(&self) -> BTreeMap<AccountKey, Tokens> {
        let mut balances = BTreeMap::new();
        for event in self.events.lock().iter() {
            match event {
                Event::Credited(e) => {
                    *balances.entry(e.account.clone()).or_insert(0) += e.amount;
                }
                Event::Debited(e) => {
                    *balances.entry(e.account.clone()).or_insert(0) -= e.amount;
                }
                _ => {}
            }
        }
        balances.retain(|_, balance| *balance > 0);
        balances
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}

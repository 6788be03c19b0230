use tracing::{debug, info};

use crate::port::{Event, Notifier};

/// A logging notifier that logs events via tracing.
///
/// The services already log their own decisions; this adds the ledger's view
/// of every balance change, with sequence numbers, for audit trails.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::Credited(e) => {
                info!(
                    sequence = e.sequence,
                    account = %e.account,
                    amount = e.amount,
                    balance = e.balance_after,
                    role = %e.role,
                    "Ledger credit"
                );
            }
            Event::Debited(e) => {
                info!(
                    sequence = e.sequence,
                    account = %e.account,
                    amount = e.amount,
                    balance = e.balance_after,
                    role = %e.role,
                    "Ledger debit"
                );
            }
            Event::ModuleRegistered(e) => {
                info!(
                    role = %e.role,
                    identity = %e.identity,
                    revoked = ?e.previous,
                    "Module authorization changed"
                );
            }
            Event::MarketResolved(e) => {
                info!(
                    market_id = %e.market_id,
                    winning_option = e.winning_option,
                    payout_total = e.payout_total,
                    retained = e.retained,
                    "Market settled"
                );
            }
            other => {
                debug!(event = ?other, "Event");
            }
        }
    }
}

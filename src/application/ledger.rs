//! Token ledger with module-scoped write access.
//!
//! The ledger is the only place balances live. Modules never keep shadow
//! balances: every reward, stake and payout goes through [`Ledger::credit`],
//! [`Ledger::debit`] or [`Ledger::credit_many`], each of which is checked
//! against the module registry and applied under a single lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{AccountKey, ModuleRole, Mutation, Tokens};
use crate::error::LedgerError;
use crate::port::{BalanceEvent, Event, ModuleEvent, NotifierRegistry};

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<AccountKey, Tokens>,
    modules: HashMap<ModuleRole, AccountKey>,
    sequence: u64,
}

impl LedgerState {
    fn balance(&self, account: &AccountKey) -> Tokens {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn authorize(
        &self,
        caller: &AccountKey,
        role: ModuleRole,
        mutation: Mutation,
    ) -> Result<(), LedgerError> {
        let registered = self.modules.get(&role) == Some(caller);
        if !registered || !role.permits(mutation) {
            let action = match mutation {
                Mutation::Credit => "credit balances",
                Mutation::Debit => "debit balances",
            };
            warn!(
                caller = %caller,
                role = %role,
                action,
                "Rejected unauthorized ledger mutation"
            );
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Shared ledger of viewer balances.
pub struct Ledger {
    administrator: AccountKey,
    state: Mutex<LedgerState>,
    notifiers: Arc<NotifierRegistry>,
}

impl Ledger {
    /// Create an empty ledger administered by `administrator`.
    #[must_use]
    pub fn new(administrator: AccountKey, notifiers: Arc<NotifierRegistry>) -> Self {
        Self {
            administrator,
            state: Mutex::new(LedgerState::default()),
            notifiers,
        }
    }

    /// The streamer/owner identity.
    #[must_use]
    pub fn administrator(&self) -> &AccountKey {
        &self.administrator
    }

    /// Check that `caller` holds the administrator capability.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] for any other identity.
    pub fn require_administrator(
        &self,
        caller: &AccountKey,
        action: &'static str,
    ) -> Result<(), LedgerError> {
        if caller != &self.administrator {
            warn!(caller = %caller, action, "Rejected non-administrator call");
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    /// Authorize `identity` to act as `role`, replacing any previous holder.
    ///
    /// Re-registering the current holder is a no-op apart from the event.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] unless `caller` is the administrator.
    pub fn register_module(
        &self,
        caller: &AccountKey,
        role: ModuleRole,
        identity: AccountKey,
    ) -> Result<(), LedgerError> {
        self.require_administrator(caller, "register modules")?;

        let previous = self.state.lock().modules.insert(role, identity.clone());
        info!(
            role = %role,
            identity = %identity,
            previous = ?previous,
            "Module registered"
        );

        let previous = previous.filter(|p| p != &identity);
        self.notifiers.notify_all(Event::ModuleRegistered(ModuleEvent {
            role,
            identity,
            previous,
        }));
        Ok(())
    }

    /// Identity currently registered for `role`.
    #[must_use]
    pub fn registered(&self, role: ModuleRole) -> Option<AccountKey> {
        self.state.lock().modules.get(&role).cloned()
    }

    /// Add `amount` tokens to `account`. Returns the new balance.
    ///
    /// A zero amount is authorized like any other call but changes nothing.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] when `caller` is not the registered
    /// module for `role`, [`LedgerError::BalanceOverflow`] when the balance
    /// cannot hold the amount.
    pub fn credit(
        &self,
        caller: &AccountKey,
        role: ModuleRole,
        account: &AccountKey,
        amount: Tokens,
    ) -> Result<Tokens, LedgerError> {
        let event = {
            let mut state = self.state.lock();
            state.authorize(caller, role, Mutation::Credit)?;

            let balance = state.balance(account);
            if amount == 0 {
                return Ok(balance);
            }
            let balance_after = balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::BalanceOverflow {
                    account: account.clone(),
                })?;
            state.balances.insert(account.clone(), balance_after);

            BalanceEvent {
                sequence: state.next_sequence(),
                role,
                account: account.clone(),
                amount,
                balance_after,
            }
        };

        info!(
            account = %account,
            amount,
            balance = event.balance_after,
            role = %role,
            "Credited"
        );
        let balance_after = event.balance_after;
        self.notifiers.notify_all(Event::Credited(event));
        Ok(balance_after)
    }

    /// Credit several accounts as one unit: either every entry is applied or
    /// none is.
    ///
    /// Entries with a zero amount are skipped.
    ///
    /// # Errors
    /// Same as [`credit`](Self::credit); an overflow on any entry rejects the
    /// whole batch.
    pub fn credit_many(
        &self,
        caller: &AccountKey,
        role: ModuleRole,
        entries: &[(AccountKey, Tokens)],
    ) -> Result<(), LedgerError> {
        let events = {
            let mut state = self.state.lock();
            state.authorize(caller, role, Mutation::Credit)?;

            // Validate the full batch before touching any balance.
            let mut staged: HashMap<&AccountKey, Tokens> = HashMap::new();
            for (account, amount) in entries {
                let current = staged
                    .get(account)
                    .copied()
                    .unwrap_or_else(|| state.balance(account));
                let next =
                    current
                        .checked_add(*amount)
                        .ok_or_else(|| LedgerError::BalanceOverflow {
                            account: account.clone(),
                        })?;
                staged.insert(account, next);
            }

            let mut events = Vec::with_capacity(entries.len());
            for (account, amount) in entries.iter().filter(|(_, amount)| *amount > 0) {
                let balance_after = state.balance(account) + amount;
                state.balances.insert(account.clone(), balance_after);
                events.push(Event::Credited(BalanceEvent {
                    sequence: state.next_sequence(),
                    role,
                    account: account.clone(),
                    amount: *amount,
                    balance_after,
                }));
            }
            events
        };

        info!(role = %role, credits = events.len(), "Batch credited");
        self.notifiers.notify_each(events);
        Ok(())
    }

    /// Remove `amount` tokens from `account`. Returns the new balance.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] when `caller` is not the registered
    /// module for `role` or the role may not debit, and
    /// [`LedgerError::InsufficientBalance`] when the balance is too small.
    pub fn debit(
        &self,
        caller: &AccountKey,
        role: ModuleRole,
        account: &AccountKey,
        amount: Tokens,
    ) -> Result<Tokens, LedgerError> {
        let event = {
            let mut state = self.state.lock();
            state.authorize(caller, role, Mutation::Debit)?;

            let balance = state.balance(account);
            if amount == 0 {
                return Ok(balance);
            }
            if amount > balance {
                debug!(
                    account = %account,
                    balance,
                    requested = amount,
                    "Debit exceeds balance"
                );
                return Err(LedgerError::InsufficientBalance {
                    account: account.clone(),
                    balance,
                    requested: amount,
                });
            }
            let balance_after = balance - amount;
            state.balances.insert(account.clone(), balance_after);

            BalanceEvent {
                sequence: state.next_sequence(),
                role,
                account: account.clone(),
                amount,
                balance_after,
            }
        };

        info!(
            account = %account,
            amount,
            balance = event.balance_after,
            role = %role,
            "Debited"
        );
        let balance_after = event.balance_after;
        self.notifiers.notify_all(Event::Debited(event));
        Ok(balance_after)
    }

    /// Balance of `account`; zero for identities never seen.
    #[must_use]
    pub fn balance_of(&self, account: &AccountKey) -> Tokens {
        self.state.lock().balance(account)
    }

    /// Snapshot of every known account, sorted by key.
    #[must_use]
    pub fn accounts(&self) -> Vec<(AccountKey, Tokens)> {
        let state = self.state.lock();
        let mut accounts: Vec<_> = state
            .balances
            .iter()
            .map(|(key, balance)| (key.clone(), *balance))
            .collect();
        accounts.sort();
        accounts
    }

    /// Sum of every balance.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.state
            .lock()
            .balances
            .values()
            .map(|b| u128::from(*b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        let ledger = Ledger::new(AccountKey::new("admin"), Arc::new(NotifierRegistry::new()));
        for role in ModuleRole::ALL {
            ledger
                .register_module(&AccountKey::new("admin"), role, module(role))
                .unwrap();
        }
        ledger
    }

    fn module(role: ModuleRole) -> AccountKey {
        AccountKey::new(format!("module:{role}"))
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        assert_eq!(ledger().balance_of(&AccountKey::new("nobody")), 0);
    }

    #[test]
    fn zero_credit_is_a_no_op() {
        let ledger = ledger();
        let v = AccountKey::new("v");
        let role = ModuleRole::Attendance;
        assert_eq!(ledger.credit(&module(role), role, &v, 0).unwrap(), 0);
        assert!(ledger.accounts().is_empty());
    }

    #[test]
    fn attendance_module_cannot_debit() {
        let ledger = ledger();
        let v = AccountKey::new("v");
        let role = ModuleRole::Attendance;
        ledger.credit(&module(role), role, &v, 5).unwrap();

        assert!(matches!(
            ledger.debit(&module(role), role, &v, 1),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert_eq!(ledger.balance_of(&v), 5);
    }

    #[test]
    fn module_cannot_claim_another_role() {
        let ledger = ledger();
        let result = ledger.credit(
            &module(ModuleRole::Attendance),
            ModuleRole::Interaction,
            &AccountKey::new("v"),
            5,
        );
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }

    #[test]
    fn overflow_is_rejected_without_change() {
        let ledger = ledger();
        let v = AccountKey::new("v");
        let role = ModuleRole::Interaction;
        ledger.credit(&module(role), role, &v, Tokens::MAX).unwrap();

        assert_eq!(
            ledger.credit(&module(role), role, &v, 1),
            Err(LedgerError::BalanceOverflow { account: v.clone() })
        );
        assert_eq!(ledger.balance_of(&v), Tokens::MAX);
    }

    #[test]
    fn credit_many_is_all_or_nothing() {
        let ledger = ledger();
        let role = ModuleRole::PredictionSystem;
        let rich = AccountKey::new("rich");
        let poor = AccountKey::new("poor");
        ledger
            .credit(&module(role), role, &rich, Tokens::MAX)
            .unwrap();

        let result = ledger.credit_many(
            &module(role),
            role,
            &[(poor.clone(), 5), (rich.clone(), 1)],
        );

        assert!(matches!(result, Err(LedgerError::BalanceOverflow { .. })));
        assert_eq!(ledger.balance_of(&poor), 0);
    }

    #[test]
    fn credit_many_accumulates_repeated_accounts() {
        let ledger = ledger();
        let role = ModuleRole::PredictionSystem;
        let v = AccountKey::new("v");
        ledger
            .credit_many(&module(role), role, &[(v.clone(), 2), (v.clone(), 3)])
            .unwrap();
        assert_eq!(ledger.balance_of(&v), 5);
    }

    #[test]
    fn total_supply_sums_balances() {
        let ledger = ledger();
        let role = ModuleRole::Interaction;
        ledger
            .credit(&module(role), role, &AccountKey::new("a"), 4)
            .unwrap();
        ledger
            .credit(&module(role), role, &AccountKey::new("b"), 6)
            .unwrap();
        assert_eq!(ledger.total_supply(), 10);
    }
}

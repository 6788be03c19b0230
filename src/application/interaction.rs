//! Paid interactions, donations and subscriptions.
//!
//! Donations and subscriptions are payments made outside the ledger; this
//! module only records them (and optionally credits bonus tokens). Requests
//! for catalog interactions are paid in ledger tokens and can be refunded
//! while still pending, including after a redeploy under a new identity.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::application::ledger::Ledger;
use crate::domain::{
    AccountKey, Interaction, InteractionId, InteractionRequest, ModuleRole, RequestId,
    RequestStatus, Supporter, Tokens,
};
use crate::error::LedgerError;
use crate::port::{
    Clock, DonationEvent, Event, InteractionAddedEvent, NotifierRegistry, RequestEvent,
    SubscriptionEvent,
};

#[derive(Debug, Default)]
struct InteractionState {
    supporters: HashMap<AccountKey, Supporter>,
    catalog: BTreeMap<InteractionId, Interaction>,
    requests: BTreeMap<RequestId, InteractionRequest>,
    next_interaction: u64,
    next_request: u64,
}

/// Tracks supporters and the interaction request queue.
pub struct InteractionSystem {
    identity: AccountKey,
    subscription_price: u64,
    tokens_per_donation_unit: Tokens,
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    state: Arc<Mutex<InteractionState>>,
}

impl InteractionSystem {
    #[must_use]
    pub fn new(
        identity: AccountKey,
        subscription_price: u64,
        tokens_per_donation_unit: Tokens,
        ledger: Arc<Ledger>,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self {
            identity,
            subscription_price,
            tokens_per_donation_unit,
            ledger,
            clock,
            notifiers,
            state: Arc::new(Mutex::new(InteractionState::default())),
        }
    }

    /// The same supporters, catalog and queue under a new ledger identity.
    #[must_use]
    pub fn with_identity(&self, identity: AccountKey) -> Self {
        Self {
            identity,
            subscription_price: self.subscription_price,
            tokens_per_donation_unit: self.tokens_per_donation_unit,
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
            notifiers: Arc::clone(&self.notifiers),
            state: Arc::clone(&self.state),
        }
    }

    /// Identity this module presents to the ledger.
    #[must_use]
    pub fn identity(&self) -> &AccountKey {
        &self.identity
    }

    #[must_use]
    pub fn subscription_price(&self) -> u64 {
        self.subscription_price
    }

    /// Record a donation of `amount` from `viewer`. Returns the bonus tokens
    /// credited, which is zero unless a donation rate is configured.
    ///
    /// # Errors
    /// [`LedgerError::InvalidAmount`] for a zero amount,
    /// [`LedgerError::BalanceOverflow`] when the bonus does not fit, and
    /// ledger authorization failures when a bonus is due.
    pub fn make_donation(&self, viewer: &AccountKey, amount: u64) -> Result<Tokens, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let bonus = amount
            .checked_mul(self.tokens_per_donation_unit)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account: viewer.clone(),
            })?;

        let total_donated = {
            let mut state = self.state.lock();
            let current = state
                .supporters
                .get(viewer)
                .map_or(0, |supporter| supporter.donated);
            let total = current.checked_add(amount).ok_or(LedgerError::InvalidAmount)?;
            if bonus > 0 {
                self.ledger
                    .credit(&self.identity, ModuleRole::Interaction, viewer, bonus)?;
            }
            state.supporters.entry(viewer.clone()).or_default().donated = total;
            total
        };

        info!(viewer = %viewer, amount, total_donated, bonus, "Donation received");
        self.notifiers
            .notify_all(Event::DonationReceived(DonationEvent {
                viewer: viewer.clone(),
                amount,
                total_donated,
                bonus_tokens: bonus,
            }));
        Ok(bonus)
    }

    /// Record a subscription payment. The viewer keeps subscriber status from
    /// the first accepted payment on.
    ///
    /// # Errors
    /// [`LedgerError::SubscriptionTooLow`] below the configured price.
    pub fn subscribe(&self, viewer: &AccountKey, amount: u64) -> Result<(), LedgerError> {
        if amount < self.subscription_price {
            debug!(viewer = %viewer, amount, "Subscription rejected");
            return Err(LedgerError::SubscriptionTooLow {
                paid: amount,
                price: self.subscription_price,
            });
        }

        let now = self.clock.now();
        {
            let mut state = self.state.lock();
            let supporter = state.supporters.entry(viewer.clone()).or_default();
            supporter.subscription_paid = supporter.subscription_paid.saturating_add(amount);
            supporter.subscribed_at.get_or_insert(now);
        }

        info!(viewer = %viewer, amount, "Subscribed");
        self.notifiers.notify_all(Event::Subscribed(SubscriptionEvent {
            viewer: viewer.clone(),
            amount,
        }));
        Ok(())
    }

    #[must_use]
    pub fn is_donor(&self, viewer: &AccountKey) -> bool {
        self.supporter(viewer).is_donor()
    }

    #[must_use]
    pub fn is_subscriber(&self, viewer: &AccountKey) -> bool {
        self.supporter(viewer).is_subscriber()
    }

    /// Cumulative donations from `viewer`.
    #[must_use]
    pub fn donated(&self, viewer: &AccountKey) -> u64 {
        self.supporter(viewer).donated
    }

    /// Supporter record for `viewer`; a default record for unknown viewers.
    #[must_use]
    pub fn supporter(&self, viewer: &AccountKey) -> Supporter {
        self.state
            .lock()
            .supporters
            .get(viewer)
            .cloned()
            .unwrap_or_default()
    }

    /// Add an interaction to the catalog.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] for non-administrators and
    /// [`LedgerError::Invalid`] for a blank description.
    pub fn add_new_interaction(
        &self,
        caller: &AccountKey,
        cost: Tokens,
        description: &str,
    ) -> Result<InteractionId, LedgerError> {
        self.ledger
            .require_administrator(caller, "add interactions")?;

        let id = {
            let mut state = self.state.lock();
            let id = InteractionId::new(state.next_interaction + 1);
            let interaction = Interaction::new(id, cost, description)?;
            state.next_interaction += 1;
            state.catalog.insert(id, interaction);
            id
        };

        info!(interaction_id = %id, cost, description, "Interaction added");
        self.notifiers
            .notify_all(Event::InteractionAdded(InteractionAddedEvent {
                interaction_id: id,
                cost,
                description: description.to_string(),
            }));
        Ok(id)
    }

    /// The catalog, in creation order.
    #[must_use]
    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().catalog.values().cloned().collect()
    }

    /// Pay for interaction `id` and queue the request.
    ///
    /// # Errors
    /// [`LedgerError::UnknownInteraction`] and ledger rejections such as
    /// [`LedgerError::InsufficientBalance`].
    pub fn request_interaction(
        &self,
        viewer: &AccountKey,
        id: InteractionId,
    ) -> Result<RequestId, LedgerError> {
        let request = {
            let mut state = self.state.lock();
            let cost = state
                .catalog
                .get(&id)
                .map(Interaction::cost)
                .ok_or(LedgerError::UnknownInteraction(id))?;

            self.ledger
                .debit(&self.identity, ModuleRole::Interaction, viewer, cost)?;

            state.next_request += 1;
            let request = InteractionRequest {
                id: RequestId::new(state.next_request),
                interaction_id: id,
                viewer: viewer.clone(),
                cost,
                status: RequestStatus::Pending,
                requested_at: self.clock.now(),
            };
            state.requests.insert(request.id, request.clone());
            request
        };

        info!(
            request_id = %request.id,
            interaction_id = %id,
            viewer = %viewer,
            cost = request.cost,
            "Interaction requested"
        );
        self.notifiers
            .notify_all(Event::InteractionRequested(request_event(&request)));
        Ok(request.id)
    }

    /// Mark a pending request as performed.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`], [`LedgerError::UnknownRequest`] and
    /// [`LedgerError::RequestNotPending`].
    pub fn fulfill_request(&self, caller: &AccountKey, id: RequestId) -> Result<(), LedgerError> {
        self.ledger
            .require_administrator(caller, "fulfill interaction requests")?;

        let request = {
            let mut state = self.state.lock();
            let request = pending_mut(&mut state, id)?;
            request.status = RequestStatus::Fulfilled;
            request.clone()
        };

        info!(request_id = %id, viewer = %request.viewer, "Interaction request fulfilled");
        self.notifiers
            .notify_all(Event::RequestFulfilled(request_event(&request)));
        Ok(())
    }

    /// Decline a pending request and return its cost to the viewer.
    ///
    /// # Errors
    /// As [`fulfill_request`](Self::fulfill_request), plus ledger rejections
    /// on the refund credit.
    pub fn refund_request(&self, caller: &AccountKey, id: RequestId) -> Result<Tokens, LedgerError> {
        self.ledger
            .require_administrator(caller, "refund interaction requests")?;

        let (request, balance_after) = {
            let mut state = self.state.lock();
            let request = pending_mut(&mut state, id)?;
            let balance_after = self.ledger.credit(
                &self.identity,
                ModuleRole::Interaction,
                &request.viewer,
                request.cost,
            )?;
            request.status = RequestStatus::Refunded;
            (request.clone(), balance_after)
        };

        info!(
            request_id = %id,
            viewer = %request.viewer,
            cost = request.cost,
            "Interaction request refunded"
        );
        self.notifiers
            .notify_all(Event::RequestRefunded(request_event(&request)));
        Ok(balance_after)
    }

    /// Requests still waiting on the streamer, oldest first.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<InteractionRequest> {
        self.state
            .lock()
            .requests
            .values()
            .filter(|request| request.is_pending())
            .cloned()
            .collect()
    }

    /// Any request by id, whatever its status.
    #[must_use]
    pub fn request(&self, id: RequestId) -> Option<InteractionRequest> {
        self.state.lock().requests.get(&id).cloned()
    }
}

fn pending_mut(
    state: &mut InteractionState,
    id: RequestId,
) -> Result<&mut InteractionRequest, LedgerError> {
    let request = state
        .requests
        .get_mut(&id)
        .ok_or(LedgerError::UnknownRequest(id))?;
    if !request.is_pending() {
        return Err(LedgerError::RequestNotPending(id));
    }
    Ok(request)
}

fn request_event(request: &InteractionRequest) -> RequestEvent {
    RequestEvent {
        request_id: request.id,
        interaction_id: request.interaction_id,
        viewer: request.viewer.clone(),
        cost: request.cost,
    }
}

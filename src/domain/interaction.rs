//! Paid interactions and supporter status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;
use super::{AccountKey, InteractionId, RequestId, Tokens};

/// An action the streamer offers in exchange for tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    id: InteractionId,
    cost: Tokens,
    description: String,
}

impl Interaction {
    /// # Errors
    /// [`DomainError::EmptyDescription`] for a blank description.
    pub fn new(
        id: InteractionId,
        cost: Tokens,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::EmptyDescription);
        }
        Ok(Self {
            id,
            cost,
            description,
        })
    }

    #[must_use]
    pub const fn id(&self) -> InteractionId {
        self.id
    }

    #[must_use]
    pub const fn cost(&self) -> Tokens {
        self.cost
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Lifecycle of a queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Paid for, waiting on the streamer.
    Pending,
    /// Performed by the streamer.
    Fulfilled,
    /// Declined; the cost went back to the viewer.
    Refunded,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

/// A viewer's paid request for an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRequest {
    pub id: RequestId,
    pub interaction_id: InteractionId,
    pub viewer: AccountKey,
    /// Cost charged when the request was made; refunds return exactly this.
    pub cost: Tokens,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

impl InteractionRequest {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Donor and subscriber standing of one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Supporter {
    /// Cumulative direct payments.
    pub donated: u64,
    /// Cumulative subscription payments.
    pub subscription_paid: u64,
    pub subscribed_at: Option<DateTime<Utc>>,
}

impl Supporter {
    #[must_use]
    pub fn is_donor(&self) -> bool {
        self.donated > 0
    }

    #[must_use]
    pub fn is_subscriber(&self) -> bool {
        self.subscribed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_description_is_rejected() {
        assert_eq!(
            Interaction::new(InteractionId::new(1), 5, "   ").unwrap_err(),
            DomainError::EmptyDescription
        );
    }

    #[test]
    fn free_interactions_are_allowed() {
        let interaction = Interaction::new(InteractionId::new(1), 0, "say hi").unwrap();
        assert_eq!(interaction.cost(), 0);
        assert_eq!(interaction.description(), "say hi");
    }

    #[test]
    fn supporter_status_follows_payments() {
        let mut supporter = Supporter::default();
        assert!(!supporter.is_donor());
        assert!(!supporter.is_subscriber());

        supporter.donated = 3;
        supporter.subscribed_at = Some(Utc::now());
        assert!(supporter.is_donor());
        assert!(supporter.is_subscriber());
    }
}

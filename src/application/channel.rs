//! Channel deployment: one ledger plus its three modules, wired together.

use std::sync::Arc;

use tracing::info;

use crate::application::attendance::AttendanceSystem;
use crate::application::interaction::InteractionSystem;
use crate::application::ledger::Ledger;
use crate::application::prediction::PredictionSystem;
use crate::domain::{AccountKey, ModuleRole, Tokens};
use crate::error::LedgerError;
use crate::port::{Clock, NotifierRegistry};

/// Identities and economy parameters for a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    pub administrator: AccountKey,
    pub attendance_module: AccountKey,
    pub prediction_module: AccountKey,
    pub interaction_module: AccountKey,
    pub attendance_reward: Tokens,
    pub prediction_stake: Tokens,
    pub subscription_price: u64,
    pub tokens_per_donation_unit: Tokens,
}

impl ChannelSettings {
    fn identity(&self, role: ModuleRole) -> &AccountKey {
        match role {
            ModuleRole::Attendance => &self.attendance_module,
            ModuleRole::PredictionSystem => &self.prediction_module,
            ModuleRole::Interaction => &self.interaction_module,
        }
    }

    fn identity_mut(&mut self, role: ModuleRole) -> &mut AccountKey {
        match role {
            ModuleRole::Attendance => &mut self.attendance_module,
            ModuleRole::PredictionSystem => &mut self.prediction_module,
            ModuleRole::Interaction => &mut self.interaction_module,
        }
    }
}

/// A deployed channel.
pub struct Channel {
    settings: ChannelSettings,
    clock: Arc<dyn Clock>,
    ledger: Arc<Ledger>,
    attendance: Arc<AttendanceSystem>,
    prediction: Arc<PredictionSystem>,
    interaction: Arc<InteractionSystem>,
}

impl Channel {
    /// Build the ledger, construct every module and register each one for
    /// its role.
    ///
    /// # Errors
    /// Only fails if registration is rejected, which cannot happen for the
    /// configured administrator.
    pub fn deploy(
        settings: &ChannelSettings,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Result<Self, LedgerError> {
        let ledger = Arc::new(Ledger::new(
            settings.administrator.clone(),
            Arc::clone(&notifiers),
        ));

        let channel = Self {
            settings: settings.clone(),
            attendance: Arc::new(build_attendance(settings, &ledger, &clock, &notifiers)),
            prediction: Arc::new(build_prediction(settings, &ledger, &clock, &notifiers)),
            interaction: Arc::new(build_interaction(settings, &ledger, &clock, &notifiers)),
            clock,
            ledger,
        };

        for role in ModuleRole::ALL {
            let identity = channel.settings.identity(role).clone();
            channel
                .ledger
                .register_module(&channel.settings.administrator, role, identity)?;
        }

        info!(
            administrator = %settings.administrator,
            attendance = %settings.attendance_module,
            prediction = %settings.prediction_module,
            interaction = %settings.interaction_module,
            "Channel deployed"
        );
        Ok(channel)
    }

    /// Move the module for `role` to `identity`.
    ///
    /// The old identity loses ledger access immediately. The module's state
    /// (session, markets and retained total, supporters and requests) carries
    /// over, so escrowed stakes and pending requests stay settleable.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] unless `caller` is the administrator.
    pub fn redeploy_module(
        &mut self,
        caller: &AccountKey,
        role: ModuleRole,
        identity: AccountKey,
    ) -> Result<(), LedgerError> {
        self.ledger.register_module(caller, role, identity.clone())?;

        match role {
            ModuleRole::Attendance => {
                self.attendance = Arc::new(self.attendance.with_identity(identity.clone()));
            }
            ModuleRole::PredictionSystem => {
                self.prediction = Arc::new(self.prediction.with_identity(identity.clone()));
            }
            ModuleRole::Interaction => {
                self.interaction = Arc::new(self.interaction.with_identity(identity.clone()));
            }
        }
        *self.settings.identity_mut(role) = identity;

        info!(role = %role, identity = %self.settings.identity(role), "Module redeployed");
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    #[must_use]
    pub fn attendance(&self) -> &Arc<AttendanceSystem> {
        &self.attendance
    }

    #[must_use]
    pub fn prediction(&self) -> &Arc<PredictionSystem> {
        &self.prediction
    }

    #[must_use]
    pub fn interaction(&self) -> &Arc<InteractionSystem> {
        &self.interaction
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

fn build_attendance(
    settings: &ChannelSettings,
    ledger: &Arc<Ledger>,
    clock: &Arc<dyn Clock>,
    notifiers: &Arc<NotifierRegistry>,
) -> AttendanceSystem {
    AttendanceSystem::new(
        settings.attendance_module.clone(),
        settings.attendance_reward,
        Arc::clone(ledger),
        Arc::clone(clock),
        Arc::clone(notifiers),
    )
}

fn build_prediction(
    settings: &ChannelSettings,
    ledger: &Arc<Ledger>,
    clock: &Arc<dyn Clock>,
    notifiers: &Arc<NotifierRegistry>,
) -> PredictionSystem {
    PredictionSystem::new(
        settings.prediction_module.clone(),
        settings.prediction_stake,
        Arc::clone(ledger),
        Arc::clone(clock),
        Arc::clone(notifiers),
    )
}

fn build_interaction(
    settings: &ChannelSettings,
    ledger: &Arc<Ledger>,
    clock: &Arc<dyn Clock>,
    notifiers: &Arc<NotifierRegistry>,
) -> InteractionSystem {
    InteractionSystem::new(
        settings.interaction_module.clone(),
        settings.subscription_price,
        settings.tokens_per_donation_unit,
        Arc::clone(ledger),
        Arc::clone(clock),
        Arc::clone(notifiers),
    )
}

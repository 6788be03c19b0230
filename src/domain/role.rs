//! Module roles recognised by the ledger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Functional role a module plays against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleRole {
    /// Rewards attendance marks.
    Attendance,
    /// Escrows bet stakes and pays out resolved markets.
    PredictionSystem,
    /// Donations, subscriptions and paid interaction requests.
    Interaction,
}

/// Kind of balance mutation a module asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Credit,
    Debit,
}

impl ModuleRole {
    /// All roles, in registration order.
    pub const ALL: [ModuleRole; 3] = [
        ModuleRole::Attendance,
        ModuleRole::PredictionSystem,
        ModuleRole::Interaction,
    ];

    /// Stable name used in logs, events and scripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::PredictionSystem => "prediction",
            Self::Interaction => "interaction",
        }
    }

    /// Whether a module in this role may perform `mutation`.
    ///
    /// Attendance only ever pays out. PredictionSystem may also debit, unlike
    /// a credit-only payout role: bet stakes are escrowed through the ledger
    /// so a market never holds balances of its own. Interaction charges for
    /// requests and refunds them.
    #[must_use]
    pub const fn permits(self, mutation: Mutation) -> bool {
        match (self, mutation) {
            (_, Mutation::Credit) => true,
            (Self::Attendance, Mutation::Debit) => false,
            (Self::PredictionSystem | Self::Interaction, Mutation::Debit) => true,
        }
    }
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "attendance" => Ok(Self::Attendance),
            "prediction" | "prediction_system" => Ok(Self::PredictionSystem),
            "interaction" => Ok(Self::Interaction),
            other => Err(format!("unknown module role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_cannot_debit() {
        assert!(ModuleRole::Attendance.permits(Mutation::Credit));
        assert!(!ModuleRole::Attendance.permits(Mutation::Debit));
    }

    #[test]
    fn prediction_and_interaction_can_debit() {
        assert!(ModuleRole::PredictionSystem.permits(Mutation::Debit));
        assert!(ModuleRole::Interaction.permits(Mutation::Debit));
    }

    #[test]
    fn parses_script_names() {
        assert_eq!(
            "prediction-system".parse::<ModuleRole>().unwrap(),
            ModuleRole::PredictionSystem
        );
        assert_eq!("Attendance".parse::<ModuleRole>().unwrap(), ModuleRole::Attendance);
        assert!("treasury".parse::<ModuleRole>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        for role in ModuleRole::ALL {
            assert_eq!(role.to_string(), role.as_str());
            assert_eq!(role.as_str().parse::<ModuleRole>().unwrap(), role);
        }
    }
}

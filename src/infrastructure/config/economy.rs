//! Channel identities and economy parameters.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountKey, Tokens};

/// Who administers the channel and which identities the modules run under.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Account key of the streamer/owner.
    pub administrator: AccountKey,
    pub attendance_module: AccountKey,
    pub prediction_module: AccountKey,
    pub interaction_module: AccountKey,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            administrator: AccountKey::new("streamer"),
            attendance_module: AccountKey::new("module:attendance"),
            prediction_module: AccountKey::new("module:prediction"),
            interaction_module: AccountKey::new("module:interaction"),
        }
    }
}

/// Attendance rewards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Tokens paid per mark.
    pub reward: Tokens,
    /// Window used when a session is started without an explicit length.
    pub default_window_minutes: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            reward: 10,
            default_window_minutes: 30,
        }
    }
}

/// Prediction markets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub default_option_count: usize,
    /// Tokens escrowed per bet.
    pub stake: Tokens,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_option_count: 3,
            stake: 1,
        }
    }
}

/// Donations, subscriptions and paid interactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Minimum payment for subscriber status.
    pub subscription_price: u64,
    /// Bonus tokens credited per donated unit. Zero disables the bonus.
    pub tokens_per_donation_unit: Tokens,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            subscription_price: 5,
            tokens_per_donation_unit: 0,
        }
    }
}

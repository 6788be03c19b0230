//! Canonical test configurations.
//!
//! Single source of truth for identities and economy values used across
//! tests, so assertions can use the constants instead of magic numbers.

use crate::application::ChannelSettings;
use crate::domain::AccountKey;

pub const ADMIN: &str = "streamer";
pub const ATTENDANCE_MODULE: &str = "module:attendance";
pub const PREDICTION_MODULE: &str = "module:prediction";
pub const INTERACTION_MODULE: &str = "module:interaction";

pub const REWARD: u64 = 10;
pub const STAKE: u64 = 1;
pub const SUBSCRIPTION_PRICE: u64 = 5;

/// Settings matching the shipped defaults, donation bonus disabled.
pub fn channel_settings() -> ChannelSettings {
    ChannelSettings {
        administrator: AccountKey::new(ADMIN),
        attendance_module: AccountKey::new(ATTENDANCE_MODULE),
        prediction_module: AccountKey::new(PREDICTION_MODULE),
        interaction_module: AccountKey::new(INTERACTION_MODULE),
        attendance_reward: REWARD,
        prediction_stake: STAKE,
        subscription_price: SUBSCRIPTION_PRICE,
        tokens_per_donation_unit: 0,
    }
}

/// A minimal valid TOML config overriding the administrator.
pub fn toml_with_admin(admin: &str) -> String {
    format!("[channel]\nadministrator = \"{admin}\"\n")
}

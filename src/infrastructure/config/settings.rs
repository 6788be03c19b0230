//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section has defaults, so an
//! empty file is a valid configuration. The administrator identity can be
//! overridden with `STREAMLEDGER_ADMIN`.
//!
//! # Example
//!
//! ```no_run
//! use streamledger::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::economy::{AttendanceConfig, ChannelConfig, InteractionConfig, PredictionConfig};
use super::logging::LoggingConfig;
use crate::application::ChannelSettings;
use crate::domain::AccountKey;
use crate::error::{ConfigError, Result};

/// Environment variable that replaces `channel.administrator`.
pub const ADMIN_ENV: &str = "STREAMLEDGER_ADMIN";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Administrator and module identities.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Attendance reward and default window.
    #[serde(default)]
    pub attendance: AttendanceConfig,

    /// Market defaults and per-bet stake.
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Subscription price and donation bonus.
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// Logging and tracing configuration.
    #[serde(default, skip_serializing)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(admin) = std::env::var(ADMIN_ENV) {
            config.channel.administrator = AccountKey::new(admin.trim());
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that identities are present and distinct, and that every
    /// amount and window is usable.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let identities = [
            ("administrator", &self.channel.administrator),
            ("attendance_module", &self.channel.attendance_module),
            ("prediction_module", &self.channel.prediction_module),
            ("interaction_module", &self.channel.interaction_module),
        ];
        let mut seen = HashSet::new();
        for (field, identity) in identities {
            if identity.as_str().trim().is_empty() {
                return Err(ConfigError::MissingField { field }.into());
            }
            if !seen.insert(identity) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("identity '{identity}' is already used by another role"),
                }
                .into());
            }
        }

        if self.attendance.reward == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reward",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.attendance.default_window_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_window_minutes",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.prediction.default_option_count < 2 {
            return Err(ConfigError::InvalidValue {
                field: "default_option_count",
                reason: "must be at least 2".to_string(),
            }
            .into());
        }
        if self.prediction.stake == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stake",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.interaction.subscription_price == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subscription_price",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !LoggingConfig::FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("must be one of {}", LoggingConfig::FORMATS.join(", ")),
            }
            .into());
        }

        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Deployment settings derived from this configuration.
    #[must_use]
    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings::from(self)
    }
}

impl From<&Config> for ChannelSettings {
    fn from(config: &Config) -> Self {
        Self {
            administrator: config.channel.administrator.clone(),
            attendance_module: config.channel.attendance_module.clone(),
            prediction_module: config.channel.prediction_module.clone(),
            interaction_module: config.channel.interaction_module.clone(),
            attendance_reward: config.attendance.reward,
            prediction_stake: config.prediction.stake,
            subscription_price: config.interaction.subscription_price,
            tokens_per_donation_unit: config.interaction.tokens_per_donation_unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.attendance.reward, 10);
        assert_eq!(config.attendance.default_window_minutes, 30);
        assert_eq!(config.prediction.default_option_count, 3);
        assert_eq!(config.prediction.stake, 1);
        assert_eq!(config.interaction.subscription_price, 5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn channel_settings_copy_economy() {
        let config = Config::parse_toml(
            r#"
            [channel]
            administrator = "host"

            [attendance]
            reward = 25

            [prediction]
            stake = 4
            "#,
        )
        .unwrap();

        let settings = config.channel_settings();
        assert_eq!(settings.attendance_reward, 25);
        assert_eq!(settings.prediction_stake, 4);
        assert_eq!(settings.attendance_module.as_str(), "module:attendance");
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let result = Config::parse_toml(
            r#"
            [channel]
            attendance_module = "bot"
            prediction_module = "bot"
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "prediction_module",
                ..
            }))
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let result = Config::parse_toml("[logging]\nformat = \"xml\"\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "format", .. }))
        ));
    }
}

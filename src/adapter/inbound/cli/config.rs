//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your channel identities", path.display()));
    output::note(&format!(
        "2. Run: streamledger config validate -c {}",
        path.display()
    ));
    output::note(&format!(
        "3. Run: streamledger run -c {} --script scenario.txt",
        path.display()
    ));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(serde_json::to_value(&config)?);
        return Ok(());
    }

    output::section("Channel");
    output::field("Administrator", &config.channel.administrator);
    output::field("Attendance", &config.channel.attendance_module);
    output::field("Prediction", &config.channel.prediction_module);
    output::field("Interaction", &config.channel.interaction_module);

    output::section("Attendance");
    output::field("Reward", format!("{} tokens", config.attendance.reward));
    output::field(
        "Window",
        format!("{} min", config.attendance.default_window_minutes),
    );

    output::section("Prediction");
    output::field("Options", config.prediction.default_option_count);
    output::field("Stake", format!("{} tokens", config.prediction.stake));

    output::section("Interaction");
    output::field("Subscription", config.interaction.subscription_price);
    output::field(
        "Donation bonus",
        if config.interaction.tokens_per_donation_unit == 0 {
            "disabled".to_string()
        } else {
            format!("{} tokens/unit", config.interaction.tokens_per_donation_unit)
        },
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());
    let config = Config::load(path)?;
    output::success("Config file is valid");

    if config.interaction.tokens_per_donation_unit > 0 {
        output::warning("donations mint bonus tokens; total supply grows with every donation");
    }

    output::field(
        "Next",
        format!("streamledger config show -c {}", path.display()),
    );

    Ok(())
}

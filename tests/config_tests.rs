use std::io::Write;

use tempfile::NamedTempFile;

use streamledger::error::{ConfigError, Error};
use streamledger::infrastructure::config::settings::Config;
use streamledger::testkit::config::{toml_with_admin, ADMIN};

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}

fn load(contents: &str) -> Result<Config, Error> {
    let file = write_temp_config(contents);
    Config::load(file.path())
}

fn rejected_field(contents: &str) -> &'static str {
    match load(contents) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
        Err(Error::Config(ConfigError::MissingField { field })) => field,
        Err(err) => panic!("Expected a field error, got {err}"),
        Ok(config) => panic!("Expected config to be rejected, got {config:?}"),
    }
}

#[test]
fn config_example_file_loads() {
    let example = include_str!("../config.toml.example");
    let config = load(example).expect("example config is valid");

    assert_eq!(config.channel.administrator.as_str(), ADMIN);
    assert_eq!(config.attendance.reward, 10);
    assert_eq!(config.prediction.stake, 1);
    assert_eq!(config.interaction.subscription_price, 5);
}

#[test]
fn config_partial_file_keeps_other_defaults() {
    let config = load(
        r#"
[attendance]
reward = 25

[prediction]
stake = 3
"#,
    )
    .expect("partial config is valid");

    let settings = config.channel_settings();
    assert_eq!(settings.attendance_reward, 25);
    assert_eq!(settings.prediction_stake, 3);
    assert_eq!(config.attendance.default_window_minutes, 30);
    assert_eq!(settings.administrator.as_str(), ADMIN);
}

#[test]
fn config_rejects_zero_reward() {
    assert_eq!(rejected_field("[attendance]\nreward = 0\n"), "reward");
}

#[test]
fn config_rejects_zero_window() {
    assert_eq!(
        rejected_field("[attendance]\ndefault_window_minutes = 0\n"),
        "default_window_minutes"
    );
}

#[test]
fn config_rejects_single_option_markets() {
    assert_eq!(
        rejected_field("[prediction]\ndefault_option_count = 1\n"),
        "default_option_count"
    );
}

#[test]
fn config_rejects_zero_stake() {
    assert_eq!(rejected_field("[prediction]\nstake = 0\n"), "stake");
}

#[test]
fn config_rejects_zero_subscription_price() {
    assert_eq!(
        rejected_field("[interaction]\nsubscription_price = 0\n"),
        "subscription_price"
    );
}

#[test]
fn config_rejects_unknown_log_format() {
    assert_eq!(rejected_field("[logging]\nformat = \"xml\"\n"), "format");
}

#[test]
fn config_rejects_empty_administrator() {
    assert_eq!(rejected_field(&toml_with_admin("")), "administrator");
}

#[test]
fn config_rejects_shared_module_identity() {
    let toml = r#"
[channel]
administrator = "streamer"
attendance_module = "bot"
prediction_module = "bot"
"#;
    assert_eq!(rejected_field(toml), "prediction_module");
}

#[test]
fn config_rejects_module_posing_as_administrator() {
    let toml = r#"
[channel]
administrator = "streamer"
interaction_module = "streamer"
"#;
    assert_eq!(rejected_field(toml), "interaction_module");
}

#[test]
fn config_reports_malformed_toml() {
    assert!(matches!(
        load("[attendance\nreward = 10"),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn config_reports_missing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

//! Runs in its own test binary: it mutates the process environment.

use streamledger::infrastructure::config::settings::{Config, ADMIN_ENV};
use streamledger::testkit::config::toml_with_admin;

#[test]
fn admin_env_overrides_file_value() {
    std::env::set_var(ADMIN_ENV, "  night-shift  ");
    let result = Config::parse_toml(&toml_with_admin("streamer"));
    std::env::remove_var(ADMIN_ENV);

    let config = result.expect("config with env override");
    assert_eq!(config.channel.administrator.as_str(), "night-shift");
    assert_eq!(
        config.channel_settings().administrator.as_str(),
        "night-shift"
    );
}

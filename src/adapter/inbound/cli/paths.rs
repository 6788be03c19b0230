//! Path utilities.
//!
//! User data lives under `~/.streamledger/`:
//! - `~/.streamledger/config.toml` - main configuration

use std::path::PathBuf;

/// Returns the home directory (`~/.streamledger/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".streamledger")
}

/// Returns the default config file path (`~/.streamledger/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

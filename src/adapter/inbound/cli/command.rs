//! Command-line interface definitions.
//!
//! Defines the CLI structure for the streamledger binary using `clap`.
//! `run` deploys a channel and replays a scenario script against it; the
//! `config` group manages configuration files.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Viewer token ledger with attendance rewards and prediction markets
#[derive(Parser, Debug)]
#[command(name = "streamledger")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a channel and run a scenario script against it
    Run(RunArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `streamledger config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for `config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file. Built-in defaults apply when omitted
    /// and `~/.streamledger/config.toml` does not exist.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scenario script; read from stdin when omitted.
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Override the configured log level (e.g. debug, warn).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print every ledger event as a JSON line after the run.
    #[arg(long)]
    pub events: bool,
}

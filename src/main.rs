use std::process::ExitCode;

use clap::Parser;
use tokio::signal;

use streamledger::adapter::inbound::cli::command::{
    Cli, ColorChoice, Commands, ConfigCommand,
};
use streamledger::adapter::inbound::cli::{config, output, run};
use streamledger::error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    tokio::select! {
        result = dispatch(cli.command) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output::error(&e.to_string());
                ExitCode::FAILURE
            }
        },
        _ = signal::ctrl_c() => {
            output::warning("Interrupted");
            ExitCode::from(130)
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => {
            output::header(env!("CARGO_PKG_VERSION"));
            run::execute(&args).await.map(|_| ())
        }
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
    }
}

//! Handler for the `run` command.
//!
//! Deploys a channel on a manual clock and replays a scenario script
//! against it. Rejected operations are reported and the script continues;
//! a script that does not parse is refused before anything runs.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::diagnostic::ScriptDiagnostic;
use crate::adapter::inbound::cli::script::{self, Operation, ScriptLine};
use crate::adapter::inbound::cli::{output, paths};
use crate::adapter::outbound::clock::ManualClock;
use crate::adapter::outbound::notifier::EventJournal;
use crate::application::Channel;
use crate::domain::{AccountKey, ModuleRole};
use crate::error::{LedgerError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Balance")]
    balance: u64,
}

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<RunSummary> {
    let mut config = load_config(args.config.clone())?;
    if let Some(level) = log_level(args) {
        config.logging.level = level;
    }
    config.init_logging();

    let source = read_script(args.script.as_ref()).await?;
    let lines = match script::parse(&source) {
        Ok(lines) => lines,
        Err(err) => {
            if !output::is_json() {
                eprintln!("{:?}", miette::Report::new(ScriptDiagnostic::new(&err, source)));
            }
            return Err(err.into());
        }
    };

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let journal = EventJournal::new();
    let mut channel =
        bootstrap::deploy_channel(&config, clock.clone(), vec![Box::new(journal.clone())])?;
    info!(lines = lines.len(), "Running scenario");

    output::section("Scenario");
    let mut summary = RunSummary::default();
    for line in &lines {
        match apply(&mut channel, &clock, &config, line) {
            Ok(outcome) => {
                summary.accepted += 1;
                output::accepted(line.number, &line.text, &outcome);
            }
            Err(err) => {
                summary.rejected += 1;
                output::rejected(line.number, &line.text, &err.to_string());
            }
        }
    }

    print_balances(&channel, summary)?;

    if args.events {
        for event in journal.events() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    Ok(summary)
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let default = paths::default_config();
            if default.exists() {
                Config::load(default)
            } else {
                Config::parse_toml("")
            }
        }
    }
}

fn log_level(args: &RunArgs) -> Option<String> {
    if let Some(level) = &args.log_level {
        return Some(level.clone());
    }
    match output::verbosity() {
        0 if output::is_quiet() => Some("warn".to_string()),
        0 => None,
        1 => Some("debug".to_string()),
        _ => Some("trace".to_string()),
    }
}

async fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => {
            let mut source = String::new();
            tokio::io::stdin().read_to_string(&mut source).await?;
            Ok(source)
        }
    }
}

/// Apply one script line. Returns a short description of what happened.
fn apply(
    channel: &mut Channel,
    clock: &ManualClock,
    config: &Config,
    line: &ScriptLine,
) -> std::result::Result<String, LedgerError> {
    let caller = &line.caller;
    let outcome = match &line.operation {
        Operation::Register { role, identity } => {
            channel
                .ledger()
                .register_module(caller, *role, identity.clone())?;
            format!("{role} -> {identity}")
        }
        Operation::Redeploy { role, identity } => {
            channel.redeploy_module(caller, *role, identity.clone())?;
            format!("{role} module now runs as {identity}")
        }
        Operation::StartAttendance { minutes } => {
            let minutes = minutes.unwrap_or(config.attendance.default_window_minutes);
            let session = channel.attendance().start_new_attendance(caller, minutes)?;
            format!(
                "{minutes} min window, closes {}",
                session.closes_at.format("%H:%M:%S")
            )
        }
        Operation::Mark => {
            let balance = channel.attendance().mark_my_attendance(caller)?;
            format!(
                "+{} tokens, balance {balance}",
                channel.attendance().reward()
            )
        }
        Operation::CreateMarket { options, label } => {
            let options = if *options == 0 {
                config.prediction.default_option_count
            } else {
                *options
            };
            let id = channel
                .prediction()
                .create_prediction(caller, label, options)?;
            format!("{id} with {options} options")
        }
        Operation::Bet { option } => {
            let pool = channel.prediction().bet_on_option(caller, *option)?;
            format!("option {option}, pool {pool}")
        }
        Operation::BetOn { market, option } => {
            let pool = channel.prediction().bet_on_market(caller, *market, *option)?;
            format!("{market} option {option}, pool {pool}")
        }
        Operation::Close => {
            let id = channel.prediction().close_betting(caller)?;
            format!("{id} closed")
        }
        Operation::CloseMarket { market } => {
            channel.prediction().close_market(caller, *market)?;
            format!("{market} closed")
        }
        Operation::Unravel { option } => {
            let settlement = channel.prediction().unravel_results(caller, *option)?;
            describe_settlement(&settlement)
        }
        Operation::UnravelMarket { market, option } => {
            let settlement = channel
                .prediction()
                .unravel_market(caller, *market, *option)?;
            format!("{market}: {}", describe_settlement(&settlement))
        }
        Operation::Donate { amount } => {
            let bonus = channel.interaction().make_donation(caller, *amount)?;
            format!(
                "donated {} in total, bonus {bonus}",
                channel.interaction().donated(caller)
            )
        }
        Operation::Subscribe { amount } => {
            channel.interaction().subscribe(caller, *amount)?;
            "subscribed".to_string()
        }
        Operation::AddInteraction { cost, description } => {
            let id = channel
                .interaction()
                .add_new_interaction(caller, *cost, description)?;
            format!("{id} costs {cost}")
        }
        Operation::Request { interaction } => {
            let id = channel.interaction().request_interaction(caller, *interaction)?;
            format!("{id} queued")
        }
        Operation::Fulfill { request } => {
            channel.interaction().fulfill_request(caller, *request)?;
            format!("{request} fulfilled")
        }
        Operation::Refund { request } => {
            let balance = channel.interaction().refund_request(caller, *request)?;
            format!("{request} refunded, balance {balance}")
        }
        Operation::Balance { viewer } => {
            let viewer = viewer.as_ref().unwrap_or(caller);
            format!("{viewer} holds {}", channel.ledger().balance_of(viewer))
        }
        Operation::Advance { minutes } => {
            clock.advance_minutes(*minutes);
            format!("+{minutes} min")
        }
    };
    Ok(outcome)
}

fn describe_settlement(settlement: &crate::domain::Settlement) -> String {
    if settlement.is_forfeit() {
        return format!(
            "option {} won, no winners, {} retained",
            settlement.winning_option, settlement.retained
        );
    }
    format!(
        "option {} won, {} winner(s) paid {} each, {} retained",
        settlement.winning_option,
        settlement.payouts.len(),
        settlement.share,
        settlement.retained
    )
}

fn account_kind(channel: &Channel, account: &AccountKey) -> &'static str {
    if account == channel.ledger().administrator() {
        return "administrator";
    }
    let is_module = ModuleRole::ALL
        .iter()
        .any(|role| channel.ledger().registered(*role).as_ref() == Some(account));
    if is_module {
        "module"
    } else {
        "viewer"
    }
}

fn print_balances(channel: &Channel, summary: RunSummary) -> Result<()> {
    let balances = channel.ledger().accounts();
    let retained = channel.prediction().retained();
    let total_supply = channel.ledger().total_supply();

    if output::is_json() {
        let accounts: serde_json::Map<String, serde_json::Value> = balances
            .iter()
            .map(|(account, balance)| (account.to_string(), json!(balance)))
            .collect();
        output::json_output(json!({
            "type": "summary",
            "payload": {
                "accepted": summary.accepted,
                "rejected": summary.rejected,
                "balances": accounts,
                "total_supply": total_supply,
                "retained": retained,
            },
        }));
        return Ok(());
    }

    output::section("Balances");
    if balances.is_empty() {
        output::note("(no balances)");
    } else {
        let rows: Vec<BalanceRow> = balances
            .iter()
            .map(|(account, balance)| BalanceRow {
                account: account.to_string(),
                kind: account_kind(channel, account),
                balance: *balance,
            })
            .collect();
        output::lines(&Table::new(rows).to_string());
    }
    output::field("Total supply", total_supply);
    output::field("Retained", retained);
    output::field(
        "Operations",
        format!("{} accepted, {} rejected", summary.accepted, summary.rejected),
    );
    Ok(())
}

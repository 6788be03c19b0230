//! Scenario script parsing.
//!
//! One command per line: `<caller> <operation> [args...]`. Blank lines and
//! lines starting with `#` are skipped. The whole script is parsed before
//! anything runs, so a typo on line 40 never leaves a half-applied scenario.

use std::fmt;
use std::str::FromStr;

use crate::domain::{AccountKey, InteractionId, MarketId, ModuleRole, RequestId, Tokens};
use crate::error::Error;

/// Operation names accepted in scripts, for help output.
pub const OPERATIONS: &[&str] = &[
    "register",
    "redeploy",
    "start-attendance",
    "mark",
    "create-market",
    "bet",
    "bet-on",
    "close",
    "close-market",
    "unravel",
    "unravel-market",
    "donate",
    "subscribe",
    "add-interaction",
    "request",
    "fulfill",
    "refund",
    "balance",
    "advance",
];

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Point a role at a new identity in the ledger registry only.
    Register { role: ModuleRole, identity: AccountKey },
    /// Move the module for a role to a new identity, keeping its state.
    Redeploy { role: ModuleRole, identity: AccountKey },
    /// `None` uses the configured default window.
    StartAttendance { minutes: Option<u32> },
    Mark,
    /// Zero options uses the configured default.
    CreateMarket { options: usize, label: String },
    Bet { option: usize },
    BetOn { market: MarketId, option: usize },
    Close,
    CloseMarket { market: MarketId },
    Unravel { option: usize },
    UnravelMarket { market: MarketId, option: usize },
    Donate { amount: u64 },
    Subscribe { amount: u64 },
    AddInteraction { cost: Tokens, description: String },
    Request { interaction: InteractionId },
    Fulfill { request: RequestId },
    Refund { request: RequestId },
    /// `None` means the caller's own balance.
    Balance { viewer: Option<AccountKey> },
    /// Move the scenario clock forward.
    Advance { minutes: u32 },
}

/// One executable line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based line number in the source.
    pub number: usize,
    /// The command as written, trimmed.
    pub text: String,
    pub caller: AccountKey,
    pub operation: Operation,
}

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-based line number.
    pub line: usize,
    /// Byte offset of the offending text in the whole script.
    pub offset: usize,
    /// Length of the offending text in bytes.
    pub len: usize,
    pub reason: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ScriptError {}

impl From<ScriptError> for Error {
    fn from(err: ScriptError) -> Self {
        Self::Script {
            line: err.line,
            reason: err.reason,
        }
    }
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns the first malformed line.
pub fn parse(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();

        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let leading = raw.len() - raw.trim_start().len();

        let number = index + 1;
        let parsed = parse_line(text).map_err(|reason| ScriptError {
            line: number,
            offset: line_start + leading,
            len: text.len(),
            reason,
        })?;
        lines.push(ScriptLine {
            number,
            text: text.to_string(),
            caller: parsed.0,
            operation: parsed.1,
        });
    }

    Ok(lines)
}

fn parse_line(text: &str) -> Result<(AccountKey, Operation), String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [caller, name, args @ ..] = tokens.as_slice() else {
        return Err("expected '<caller> <operation> [args...]'".to_string());
    };
    let args = Args { op: *name, args };

    let operation = match *name {
        "register" => {
            args.exact(2)?;
            Operation::Register {
                role: args.parse(0, "role")?,
                identity: AccountKey::new(args.args[1]),
            }
        }
        "redeploy" => {
            args.exact(2)?;
            Operation::Redeploy {
                role: args.parse(0, "role")?,
                identity: AccountKey::new(args.args[1]),
            }
        }
        "start-attendance" => {
            args.at_most(1)?;
            Operation::StartAttendance {
                minutes: args.optional(0, "minutes")?,
            }
        }
        "mark" => {
            args.exact(0)?;
            Operation::Mark
        }
        "create-market" => {
            if args.args.len() < 2 {
                return Err("create-market expects <options> <label...>".to_string());
            }
            Operation::CreateMarket {
                options: args.parse(0, "options")?,
                label: args.args[1..].join(" "),
            }
        }
        "bet" => {
            args.exact(1)?;
            Operation::Bet {
                option: args.parse(0, "option")?,
            }
        }
        "bet-on" => {
            args.exact(2)?;
            Operation::BetOn {
                market: args.parse(0, "market")?,
                option: args.parse(1, "option")?,
            }
        }
        "close" => {
            args.exact(0)?;
            Operation::Close
        }
        "close-market" => {
            args.exact(1)?;
            Operation::CloseMarket {
                market: args.parse(0, "market")?,
            }
        }
        "unravel" => {
            args.exact(1)?;
            Operation::Unravel {
                option: args.parse(0, "option")?,
            }
        }
        "unravel-market" => {
            args.exact(2)?;
            Operation::UnravelMarket {
                market: args.parse(0, "market")?,
                option: args.parse(1, "option")?,
            }
        }
        "donate" => {
            args.exact(1)?;
            Operation::Donate {
                amount: args.parse(0, "amount")?,
            }
        }
        "subscribe" => {
            args.exact(1)?;
            Operation::Subscribe {
                amount: args.parse(0, "amount")?,
            }
        }
        "add-interaction" => {
            if args.args.len() < 2 {
                return Err("add-interaction expects <cost> <description...>".to_string());
            }
            Operation::AddInteraction {
                cost: args.parse(0, "cost")?,
                description: args.args[1..].join(" "),
            }
        }
        "request" => {
            args.exact(1)?;
            Operation::Request {
                interaction: args.parse(0, "interaction")?,
            }
        }
        "fulfill" => {
            args.exact(1)?;
            Operation::Fulfill {
                request: args.parse(0, "request")?,
            }
        }
        "refund" => {
            args.exact(1)?;
            Operation::Refund {
                request: args.parse(0, "request")?,
            }
        }
        "balance" => {
            args.at_most(1)?;
            Operation::Balance {
                viewer: args.args.first().map(|viewer| AccountKey::new(*viewer)),
            }
        }
        "advance" => {
            args.exact(1)?;
            Operation::Advance {
                minutes: args.parse(0, "minutes")?,
            }
        }
        other => return Err(format!("unknown operation '{other}'")),
    };

    Ok((AccountKey::new(*caller), operation))
}

struct Args<'a> {
    op: &'a str,
    args: &'a [&'a str],
}

impl Args<'_> {
    fn exact(&self, count: usize) -> Result<(), String> {
        if self.args.len() == count {
            Ok(())
        } else {
            Err(format!(
                "{} expects {count} argument(s), got {}",
                self.op,
                self.args.len()
            ))
        }
    }

    fn at_most(&self, count: usize) -> Result<(), String> {
        if self.args.len() <= count {
            Ok(())
        } else {
            Err(format!(
                "{} expects at most {count} argument(s), got {}",
                self.op,
                self.args.len()
            ))
        }
    }

    fn parse<T>(&self, index: usize, name: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self
            .args
            .get(index)
            .ok_or_else(|| format!("{} is missing <{name}>", self.op))?;
        raw.parse()
            .map_err(|err| format!("invalid {name} '{raw}': {err}"))
    }

    fn optional<T>(&self, index: usize, name: &str) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if index < self.args.len() {
            self.parse(index, name).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let lines = parse("# setup\n\n  streamer start-attendance 15\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[0].caller.as_str(), "streamer");
        assert_eq!(
            lines[0].operation,
            Operation::StartAttendance { minutes: Some(15) }
        );
    }

    #[test]
    fn joins_multi_word_labels() {
        let lines = parse("streamer create-market 2 Who wins the match?").unwrap();
        assert_eq!(
            lines[0].operation,
            Operation::CreateMarket {
                options: 2,
                label: "Who wins the match?".to_string(),
            }
        );
    }

    #[test]
    fn accepts_prefixed_and_bare_ids() {
        let lines = parse("bob bet-on market-2 1\nstreamer fulfill 3").unwrap();
        assert_eq!(
            lines[0].operation,
            Operation::BetOn {
                market: MarketId::new(2),
                option: 1,
            }
        );
        assert_eq!(
            lines[1].operation,
            Operation::Fulfill {
                request: RequestId::new(3),
            }
        );
    }

    #[test]
    fn balance_viewer_is_optional() {
        let lines = parse("bob balance\nstreamer balance alice").unwrap();
        assert_eq!(lines[0].operation, Operation::Balance { viewer: None });
        assert_eq!(
            lines[1].operation,
            Operation::Balance {
                viewer: Some(AccountKey::new("alice")),
            }
        );
    }

    #[test]
    fn reports_position_of_bad_line() {
        let source = "alice mark\n  bob bet two\n";
        let err = parse(source).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(&source[err.offset..err.offset + err.len], "bob bet two");
        assert!(err.reason.contains("invalid option"));
    }

    #[test]
    fn rejects_unknown_operations_and_missing_args() {
        assert!(parse("alice dance").unwrap_err().reason.contains("unknown operation"));
        assert!(parse("alice").is_err());
        assert!(parse("streamer register attendance").is_err());
        assert!(parse("streamer register treasury bot").is_err());
    }
}

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::{AccountKey, InteractionId, MarketId, MarketStatus, RequestId, Tokens};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Rejections raised by the ledger and the modules that mutate it.
///
/// Every variant is returned before any state is touched: a call that fails
/// leaves balances, sessions and markets exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: AccountKey,
        action: &'static str,
    },

    #[error("insufficient balance for {account}: {balance} < {requested}")]
    InsufficientBalance {
        account: AccountKey,
        balance: Tokens,
        requested: Tokens,
    },

    #[error("balance of {account} would overflow")]
    BalanceOverflow { account: AccountKey },

    #[error("{viewer} already marked attendance in this session")]
    AlreadyMarked { viewer: AccountKey },

    #[error("attendance window closed at {closed_at}")]
    WindowExpired {
        closed_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("no attendance session has been started")]
    NoActiveSession,

    #[error("{market_id} is {status}, operation not allowed")]
    InvalidState {
        market_id: MarketId,
        status: MarketStatus,
    },

    #[error("betting on {market_id} is closed")]
    MarketClosed { market_id: MarketId },

    #[error("{viewer} already bet on option {option} in {market_id}")]
    DuplicateBet {
        market_id: MarketId,
        viewer: AccountKey,
        option: usize,
    },

    #[error("pool of {market_id} cannot take another stake")]
    PoolOverflow { market_id: MarketId },

    #[error("{market_id} is already resolved")]
    AlreadyResolved { market_id: MarketId },

    #[error("no active prediction market")]
    NoActiveMarket,

    #[error("unknown prediction market {0}")]
    UnknownMarket(MarketId),

    #[error("option {index} out of range (market has {option_count} options)")]
    OutOfRange { index: usize, option_count: usize },

    #[error("unknown interaction {0}")]
    UnknownInteraction(InteractionId),

    #[error("unknown interaction request {0}")]
    UnknownRequest(RequestId),

    #[error("interaction request {0} is no longer pending")]
    RequestNotPending(RequestId),

    #[error("subscription payment {paid} is below the price of {price}")]
    SubscriptionTooLow { paid: u64, price: u64 },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("script error on line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

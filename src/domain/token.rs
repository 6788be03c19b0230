//! Token amounts.

/// Whole tokens. There are no fractional tokens; every split truncates.
pub type Tokens = u64;

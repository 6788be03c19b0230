//! Pure domain logic: identifiers, amounts and the state machines
//! the ledger modules drive.

mod attendance;
mod id;
mod interaction;
mod market;
mod role;
mod token;

pub mod error;
pub mod payout;

pub use attendance::AttendanceSession;
pub use id::{AccountKey, InteractionId, MarketId, ParseIdError, RequestId};
pub use interaction::{Interaction, InteractionRequest, RequestStatus, Supporter};
pub use market::{Bet, MarketStatus, PredictionMarket};
pub use payout::Settlement;
pub use role::{ModuleRole, Mutation};
pub use token::Tokens;

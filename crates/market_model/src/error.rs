//! Market error kinds
//!
//! Every variant is a precondition violation detected before any state
//! mutation; a failed call never partially applies.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MarketError {
    /// Betting is over: the market is resolved or the deadline has passed
    #[error("market is closed to new bets")]
    MarketClosed,

    /// Bet carried no value
    #[error("bet amount must be greater than zero")]
    ZeroAmount,

    /// Resolution attempted before the deadline
    #[error("market cannot be resolved before {resolution_timestamp} (now {now})")]
    TooEarly { now: u64, resolution_timestamp: u64 },

    /// Resolution attempted a second time
    #[error("market is already resolved")]
    AlreadyResolved,

    /// Price read failed; carries the oracle's reason verbatim
    #[error("price oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Redemption attempted while the market is still open
    #[error("market is not resolved yet")]
    NotResolved,

    /// Depositor was already paid
    #[error("winnings already redeemed")]
    AlreadyRedeemed,

    /// Depositor holds no stake on the winning side
    #[error("no stake on the winning side")]
    NothingToClaim,

    /// Counter would exceed the integer range
    #[error("arithmetic overflow")]
    Overflow,

    /// Construction parameters rejected
    #[error("invalid market parameters: {0}")]
    InvalidParams(&'static str),
}

pub type Result<T> = core::result::Result<T, MarketError>;

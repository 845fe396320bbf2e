//! Up/Down price-target escrow market
//!
//! A [`Market`] accepts wagers into two mutually exclusive pools until a
//! deadline, resolves exactly once against a [`PriceOracle`] and then lets
//! every winning depositor redeem a pro-rata share of the combined pool.
//!
//! # Properties
//! - **Conservation**: the live pools always sum to deposits minus payouts
//! - **Single resolution**: settlement values are written once and never change
//! - **No late deposits**: bets are rejected once resolved or past the deadline
//! - **Single redemption**: a depositor is paid at most once
//! - **Proportionality**: `payout = stake * total_pool / winning_pool`, truncated
//!
//! Every operation validates all preconditions before touching state, so a
//! rejected call leaves the market exactly as it was.

#![forbid(unsafe_code)]

pub mod address;
pub mod error;
pub mod events;
pub mod ledger;
pub mod market;
pub mod math;
pub mod oracle;
pub mod position;
pub mod shared;

#[cfg(test)]
mod negative_tests;

pub use address::{Address, ParseAddressError};
pub use error::{MarketError, Result};
pub use events::MarketEvent;
pub use ledger::{Ledger, Stake};
pub use market::{winning_position, DepositorView, Market, MarketParams, MarketSnapshot, Settlement};
pub use math::pro_rata_payout;
pub use oracle::{OracleError, PriceFeed, PriceOracle};
pub use position::{InvalidDiscriminant, MarketState, Position};
pub use shared::{PayoutSink, RedeemError, SharedMarket, TransferError};

/// Fixed-point decimals of oracle prices and the price target (`300000000000` = 3000.0)
pub const PRICE_DECIMALS: u32 = 8;

/// Decimals of wagered amounts (native currency base units)
pub const AMOUNT_DECIMALS: u32 = 18;

/// Side that wins when the final price equals the target exactly
pub const TIE_BREAK_POSITION: Position = Position::Down;

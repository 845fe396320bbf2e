//! Notifications emitted by successful market operations

use crate::{Address, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event"))]
pub enum MarketEvent {
    BetPlaced {
        user: Address,
        position: Position,
        amount: u128,
    },
    MarketResolved {
        final_price: u128,
        winning_position: Position,
    },
    Redeemed {
        user: Address,
        amount: u128,
    },
}

impl MarketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::BetPlaced { .. } => "BetPlaced",
            MarketEvent::MarketResolved { .. } => "MarketResolved",
            MarketEvent::Redeemed { .. } => "Redeemed",
        }
    }
}

//! Bet sides and market lifecycle states
//!
//! Discriminants match the contract ABI (`uint8` enums).

use core::fmt;
use thiserror::Error;

/// Side of a wager relative to the price target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Position {
    /// Final price strictly above the target
    Up,
    /// Final price at or below the target
    Down,
}

/// Lifecycle of a market. The only transition is `Open -> Resolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MarketState {
    Open,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid {kind} discriminant: {value}")]
pub struct InvalidDiscriminant {
    pub kind: &'static str,
    pub value: u8,
}

impl Position {
    pub const ALL: [Position; 2] = [Position::Up, Position::Down];

    pub fn opposite(self) -> Self {
        match self {
            Position::Up => Position::Down,
            Position::Down => Position::Up,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Position::Up => 0,
            Position::Down => 1,
        }
    }

    /// Slot in per-side arrays
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.as_u8() as usize
    }
}

impl TryFrom<u8> for Position {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Position::Up),
            1 => Ok(Position::Down),
            _ => Err(InvalidDiscriminant { kind: "position", value }),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Up => f.write_str("UP"),
            Position::Down => f.write_str("DOWN"),
        }
    }
}

impl MarketState {
    pub fn as_u8(self) -> u8 {
        match self {
            MarketState::Open => 0,
            MarketState::Resolved => 1,
        }
    }
}

impl TryFrom<u8> for MarketState {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MarketState::Open),
            1 => Ok(MarketState::Resolved),
            _ => Err(InvalidDiscriminant { kind: "market state", value }),
        }
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketState::Open => f.write_str("Open"),
            MarketState::Resolved => f.write_str("Resolved"),
        }
    }
}

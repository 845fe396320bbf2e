//! Price oracle seam
//!
//! The market trusts the value an oracle reports and only handles the read
//! failing. It reads once per resolution attempt and never caches.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::Address;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Feed has never published a price, or it was withdrawn
    #[error("no price has been reported")]
    NoData,

    /// Source could not be reached
    #[error("{0}")]
    Unavailable(String),
}

/// Trusted source of the settlement price
///
/// Prices use the same fixed-point convention as the market's price target
/// ([`crate::PRICE_DECIMALS`]).
pub trait PriceOracle {
    /// Identity the market was configured to trust
    fn address(&self) -> Address;

    /// Current price. Called exactly once per resolution attempt.
    fn latest_price(&self) -> Result<u128, OracleError>;
}

impl<O: PriceOracle + ?Sized> PriceOracle for Box<O> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn latest_price(&self) -> Result<u128, OracleError> {
        (**self).latest_price()
    }
}

impl<O: PriceOracle + ?Sized> PriceOracle for Arc<O> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn latest_price(&self) -> Result<u128, OracleError> {
        (**self).latest_price()
    }
}

/// In-process price feed
///
/// Clones share one slot: the host keeps a handle and publishes observed
/// prices while the market holds another handle as its oracle.
#[derive(Clone, Debug)]
pub struct PriceFeed {
    address: Address,
    latest: Arc<RwLock<Option<u128>>>,
}

impl PriceFeed {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_price(address: Address, price: u128) -> Self {
        let feed = Self::new(address);
        feed.publish(price);
        feed
    }

    pub fn publish(&self, price: u128) {
        *self.latest.write() = Some(price);
    }

    /// Withdraw the current price; reads fail with [`OracleError::NoData`]
    pub fn clear(&self) {
        *self.latest.write() = None;
    }

    pub fn peek(&self) -> Option<u128> {
        *self.latest.read()
    }
}

impl PriceOracle for PriceFeed {
    fn address(&self) -> Address {
        self.address
    }

    fn latest_price(&self) -> Result<u128, OracleError> {
        self.latest.read().ok_or(OracleError::NoData)
    }
}

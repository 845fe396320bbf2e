//! Thread-safe market handle
//!
//! All ledger mutations run under one mutex, giving every deposit,
//! resolution and redemption a strict total order. Payout transfers run
//! after the lock is released: a transfer that calls back into the market
//! cannot deadlock and observes the redemption already recorded.

use std::sync::Arc;

use log::error;
use parking_lot::Mutex;
use thiserror::Error;

use crate::{Address, Market, MarketError, MarketSnapshot, Position, PriceOracle, Settlement};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

/// Destination for redeemed value (wallet, bank ledger, test recorder)
pub trait PayoutSink {
    fn transfer(&self, to: Address, amount: u128) -> Result<(), TransferError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RedeemError {
    #[error(transparent)]
    Market(#[from] MarketError),

    /// The redemption is recorded; the host must reconcile `amount` to `to`
    #[error("payout of {amount} to {to} recorded but transfer failed: {source}")]
    Transfer {
        to: Address,
        amount: u128,
        #[source]
        source: TransferError,
    },
}

pub struct SharedMarket<O> {
    inner: Arc<Mutex<Market<O>>>,
}

impl<O> Clone for SharedMarket<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: PriceOracle> SharedMarket<O> {
    pub fn new(market: Market<O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    pub fn place_bet(&self, user: Address, position: Position, amount: u128, now: u64) -> crate::Result<()> {
        self.inner.lock().place_bet(user, position, amount, now)
    }

    pub fn resolve_market(&self, now: u64) -> crate::Result<Settlement> {
        self.inner.lock().resolve_market(now)
    }

    /// Record the redemption under the lock, release it, then pay through `sink`.
    pub fn redeem(&self, user: Address, sink: &dyn PayoutSink) -> Result<u128, RedeemError> {
        let payout = self.inner.lock().redeem(user)?;

        sink.transfer(user, payout).map_err(|source| {
            error!("payout of {} to {} recorded but not delivered: {}", payout, user, source);
            RedeemError::Transfer {
                to: user,
                amount: payout,
                source,
            }
        })?;
        Ok(payout)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.inner.lock().snapshot()
    }

    /// Run `f` with exclusive access for queries spanning several fields
    pub fn with<R>(&self, f: impl FnOnce(&Market<O>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive mutable access, e.g. to drain events
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Market<O>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

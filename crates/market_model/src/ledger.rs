//! Escrow ledger: per-side pools, per-depositor stakes and redemption flags
//!
//! Mutations compute every new value with checked arithmetic first and only
//! then write, so an `Err` leaves the ledger untouched.

use std::collections::HashMap;

use crate::{Address, MarketError, Position, Result};

/// One depositor's cumulative wagers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stake {
    pub up: u128,
    pub down: u128,
    /// Set once, when the winning share is paid out
    pub redeemed: bool,
}

impl Stake {
    pub fn on(&self, position: Position) -> u128 {
        match position {
            Position::Up => self.up,
            Position::Down => self.down,
        }
    }

    fn on_mut(&mut self, position: Position) -> &mut u128 {
        match position {
            Position::Up => &mut self.up,
            Position::Down => &mut self.down,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Live escrow per side, indexed by `Position::index`
    pools: [u128; 2],
    stakes: HashMap<Address, Stake>,
    /// Depositors in first-deposit order
    order: Vec<Address>,
    total_deposited: u128,
    total_paid: u128,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, position: Position) -> u128 {
        self.pools[position.index()]
    }

    /// Value currently held in escrow
    pub fn balance(&self) -> u128 {
        // Bounded by total_deposited, which was itself checked on the way in.
        self.pools[0] + self.pools[1]
    }

    pub fn stake(&self, depositor: &Address) -> Stake {
        self.stakes.get(depositor).copied().unwrap_or_default()
    }

    pub fn total_deposited(&self) -> u128 {
        self.total_deposited
    }

    pub fn total_paid(&self) -> u128 {
        self.total_paid
    }

    pub fn depositors(&self) -> impl Iterator<Item = (&Address, &Stake)> + '_ {
        self.order.iter().filter_map(|a| self.stakes.get(a).map(|s| (a, s)))
    }

    pub fn depositor_count(&self) -> usize {
        self.order.len()
    }

    /// Add a wager to `position` for `depositor`
    pub fn credit(&mut self, depositor: Address, position: Position, amount: u128) -> Result<()> {
        if amount == 0 {
            return Err(MarketError::ZeroAmount);
        }

        let current = self.stake(&depositor);
        let new_stake = current
            .on(position)
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        let new_pool = self.pools[position.index()]
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        let new_total = self
            .total_deposited
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;

        let entry = self.stakes.entry(depositor).or_insert_with(|| {
            self.order.push(depositor);
            Stake::default()
        });
        *entry.on_mut(position) = new_stake;
        self.pools[position.index()] = new_pool;
        self.total_deposited = new_total;
        Ok(())
    }

    /// Record a winner's payout: flag the depositor, then draw the payout out
    /// of the live pools.
    ///
    /// The depositor's own `stake` leaves the winning pool; the remainder
    /// (`payout - stake`) leaves the losing pool.
    pub fn settle_redemption(
        &mut self,
        depositor: Address,
        winning: Position,
        stake: u128,
        payout: u128,
    ) -> Result<()> {
        let entry = self.stakes.get(&depositor).ok_or(MarketError::NothingToClaim)?;
        if entry.redeemed {
            return Err(MarketError::AlreadyRedeemed);
        }

        let profit = payout.checked_sub(stake).ok_or(MarketError::Overflow)?;
        let new_winning = self.pools[winning.index()]
            .checked_sub(stake)
            .ok_or(MarketError::Overflow)?;
        let new_losing = self.pools[winning.opposite().index()]
            .checked_sub(profit)
            .ok_or(MarketError::Overflow)?;
        let new_paid = self.total_paid.checked_add(payout).ok_or(MarketError::Overflow)?;

        if let Some(entry) = self.stakes.get_mut(&depositor) {
            entry.redeemed = true;
        }
        self.pools[winning.index()] = new_winning;
        self.pools[winning.opposite().index()] = new_losing;
        self.total_paid = new_paid;
        Ok(())
    }
}

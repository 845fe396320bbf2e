//! Up/Down escrow market state machine
//!
//! Lifecycle:
//! 1. `Open`: depositors call [`Market::place_bet`] until the deadline
//! 2. At or after the deadline anyone calls [`Market::resolve_market`], which
//!    reads the oracle once and freezes a [`Settlement`]
//! 3. `Resolved`: each winner calls [`Market::redeem`] exactly once
//!
//! Payouts are computed from the frozen settlement totals, while the live
//! pools are drawn down as payouts leave escrow.

use core::cmp::Ordering;

use log::{debug, info, warn};

use crate::{
    math, Address, Ledger, MarketError, MarketEvent, MarketState, Position, PriceOracle, Result,
    Stake, TIE_BREAK_POSITION,
};

/// Immutable construction parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketParams {
    /// Threshold in [`crate::PRICE_DECIMALS`] fixed point
    pub price_target: u128,
    /// Unix seconds; betting closes and resolution opens here
    pub resolution_timestamp: u64,
    /// Price source the market trusts
    pub oracle: Address,
}

/// Outcome frozen at resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settlement {
    pub final_price: u128,
    pub winning_position: Position,
    /// `pool[Up] + pool[Down]` at resolution
    pub total_pool: u128,
    /// `pool[winning_position]` at resolution
    pub winning_pool: u128,
    pub resolved_at: u64,
}

impl Settlement {
    pub fn losing_pool(&self) -> u128 {
        self.total_pool - self.winning_pool
    }
}

/// Winning side for a final price. Equality goes to [`TIE_BREAK_POSITION`].
pub fn winning_position(final_price: u128, price_target: u128) -> Position {
    match final_price.cmp(&price_target) {
        Ordering::Greater => Position::Up,
        Ordering::Less => Position::Down,
        Ordering::Equal => TIE_BREAK_POSITION,
    }
}

pub struct Market<O> {
    params: MarketParams,
    oracle: O,
    ledger: Ledger,
    settlement: Option<Settlement>,
    events: Vec<MarketEvent>,
}

impl<O: PriceOracle> Market<O> {
    /// Create an open market. `oracle` must report the identity named in `params`.
    pub fn new(params: MarketParams, oracle: O) -> Result<Self> {
        if params.price_target == 0 {
            return Err(MarketError::InvalidParams("price target must be positive"));
        }
        if oracle.address() != params.oracle {
            return Err(MarketError::InvalidParams("oracle does not match configured address"));
        }
        info!(
            "market created: target={} deadline={} oracle={}",
            params.price_target, params.resolution_timestamp, params.oracle
        );
        Ok(Self {
            params,
            oracle,
            ledger: Ledger::new(),
            settlement: None,
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Mutating surface
    // ------------------------------------------------------------------

    /// Escrow `amount` on `position` for `user`.
    ///
    /// Rejected with `MarketClosed` once resolved or when `now` is at or past
    /// the deadline, even if nobody has resolved yet.
    pub fn place_bet(&mut self, user: Address, position: Position, amount: u128, now: u64) -> Result<()> {
        if self.settlement.is_some() || now >= self.params.resolution_timestamp {
            return Err(MarketError::MarketClosed);
        }
        if amount == 0 {
            return Err(MarketError::ZeroAmount);
        }

        self.ledger.credit(user, position, amount)?;
        debug!("bet placed: user={} position={} amount={}", user, position, amount);
        self.events.push(MarketEvent::BetPlaced { user, position, amount });
        Ok(())
    }

    /// Resolve against the oracle. Permissionless; succeeds at most once.
    pub fn resolve_market(&mut self, now: u64) -> Result<Settlement> {
        if self.settlement.is_some() {
            return Err(MarketError::AlreadyResolved);
        }
        if now < self.params.resolution_timestamp {
            return Err(MarketError::TooEarly {
                now,
                resolution_timestamp: self.params.resolution_timestamp,
            });
        }

        let final_price = self.oracle.latest_price().map_err(|e| {
            warn!("oracle {} read failed: {}", self.params.oracle, e);
            MarketError::OracleUnavailable(e.to_string())
        })?;

        let winning = winning_position(final_price, self.params.price_target);
        let settlement = Settlement {
            final_price,
            winning_position: winning,
            total_pool: self.ledger.balance(),
            winning_pool: self.ledger.pool(winning),
            resolved_at: now,
        };
        self.settlement = Some(settlement);

        info!(
            "market resolved: price={} target={} winner={} total_pool={} winning_pool={}",
            final_price, self.params.price_target, winning, settlement.total_pool, settlement.winning_pool
        );
        if settlement.winning_pool == 0 && settlement.total_pool > 0 {
            warn!(
                "no stake on winning side {}; {} stays locked in escrow",
                winning, settlement.total_pool
            );
        }

        self.events.push(MarketEvent::MarketResolved {
            final_price,
            winning_position: winning,
        });
        Ok(settlement)
    }

    /// Record `user`'s redemption and return the amount owed.
    ///
    /// The redeemed flag is written before this returns, so the caller's
    /// transfer of the returned amount always happens after the ledger
    /// update; a repeated call fails with `AlreadyRedeemed`.
    pub fn redeem(&mut self, user: Address) -> Result<u128> {
        let settlement = self.settlement.ok_or(MarketError::NotResolved)?;
        let stake = self.ledger.stake(&user);
        if stake.redeemed {
            return Err(MarketError::AlreadyRedeemed);
        }
        let winning_stake = stake.on(settlement.winning_position);
        if winning_stake == 0 {
            return Err(MarketError::NothingToClaim);
        }

        let payout = math::pro_rata_payout(winning_stake, settlement.total_pool, settlement.winning_pool)
            .ok_or(MarketError::Overflow)?;
        self.ledger
            .settle_redemption(user, settlement.winning_position, winning_stake, payout)?;

        info!("redeemed: user={} stake={} payout={}", user, winning_stake, payout);
        self.events.push(MarketEvent::Redeemed { user, amount: payout });
        Ok(payout)
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    pub fn params(&self) -> &MarketParams {
        &self.params
    }

    pub fn price_target(&self) -> u128 {
        self.params.price_target
    }

    pub fn resolution_timestamp(&self) -> u64 {
        self.params.resolution_timestamp
    }

    /// Identity of the trusted price source
    pub fn oracle(&self) -> Address {
        self.params.oracle
    }

    pub fn price_oracle(&self) -> &O {
        &self.oracle
    }

    pub fn state(&self) -> MarketState {
        if self.settlement.is_some() {
            MarketState::Resolved
        } else {
            MarketState::Open
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn final_price(&self) -> Option<u128> {
        self.settlement.map(|s| s.final_price)
    }

    pub fn winning_position(&self) -> Option<Position> {
        self.settlement.map(|s| s.winning_position)
    }

    /// Live escrow on one side
    pub fn total_bets(&self, position: Position) -> u128 {
        self.ledger.pool(position)
    }

    pub fn total_bets_up(&self) -> u128 {
        self.total_bets(Position::Up)
    }

    pub fn total_bets_down(&self) -> u128 {
        self.total_bets(Position::Down)
    }

    pub fn bets(&self, user: &Address, position: Position) -> u128 {
        self.ledger.stake(user).on(position)
    }

    pub fn bets_up(&self, user: &Address) -> u128 {
        self.bets(user, Position::Up)
    }

    pub fn bets_down(&self, user: &Address) -> u128 {
        self.bets(user, Position::Down)
    }

    pub fn stake(&self, user: &Address) -> Stake {
        self.ledger.stake(user)
    }

    pub fn has_redeemed(&self, user: &Address) -> bool {
        self.ledger.stake(user).redeemed
    }

    /// Value held in escrow: deposits minus payouts
    pub fn balance(&self) -> u128 {
        self.ledger.balance()
    }

    pub fn total_deposited(&self) -> u128 {
        self.ledger.total_deposited()
    }

    pub fn total_paid(&self) -> u128 {
        self.ledger.total_paid()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// What `redeem` would pay `user` now, without recording anything.
    ///
    /// `Ok(0)` for losers and for depositors already paid.
    pub fn quote_payout(&self, user: &Address) -> Result<u128> {
        let settlement = self.settlement.ok_or(MarketError::NotResolved)?;
        let stake = self.ledger.stake(user);
        let winning_stake = stake.on(settlement.winning_position);
        if stake.redeemed || winning_stake == 0 {
            return Ok(0);
        }
        math::pro_rata_payout(winning_stake, settlement.total_pool, settlement.winning_pool)
            .ok_or(MarketError::Overflow)
    }

    /// Resolved with nobody on the winning side: escrow can never be paid out
    pub fn is_locked(&self) -> bool {
        matches!(self.settlement, Some(s) if s.winning_pool == 0 && s.total_pool > 0)
    }

    /// Rounding residue left once every winner has redeemed; zero before that
    pub fn dust(&self) -> u128 {
        match self.settlement {
            Some(s) if s.winning_pool > 0 && self.ledger.pool(s.winning_position) == 0 => {
                self.ledger.balance()
            }
            _ => 0,
        }
    }

    pub fn depositors(&self) -> impl Iterator<Item = (&Address, &Stake)> + '_ {
        self.ledger.depositors()
    }

    /// Events since the last [`Market::drain_events`].
    ///
    /// The journal is unbounded; long-lived hosts should drain it after
    /// forwarding events.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            price_target: self.params.price_target,
            resolution_timestamp: self.params.resolution_timestamp,
            oracle: self.params.oracle,
            state: self.state(),
            total_bets_up: self.total_bets_up(),
            total_bets_down: self.total_bets_down(),
            balance: self.balance(),
            total_deposited: self.total_deposited(),
            total_paid: self.total_paid(),
            settlement: self.settlement,
            locked: self.is_locked(),
            dust: self.dust(),
            depositors: self
                .depositors()
                .map(|(address, stake)| DepositorView {
                    address: *address,
                    up: stake.up,
                    down: stake.down,
                    redeemed: stake.redeemed,
                })
                .collect(),
        }
    }
}

/// Read-only view of a depositor
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DepositorView {
    pub address: Address,
    pub up: u128,
    pub down: u128,
    pub redeemed: bool,
}

/// Everything on the query surface at one instant
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarketSnapshot {
    pub price_target: u128,
    pub resolution_timestamp: u64,
    pub oracle: Address,
    pub state: MarketState,
    pub total_bets_up: u128,
    pub total_bets_down: u128,
    pub balance: u128,
    pub total_deposited: u128,
    pub total_paid: u128,
    pub settlement: Option<Settlement>,
    pub locked: bool,
    pub dust: u128,
    pub depositors: Vec<DepositorView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OracleError, PriceFeed};
    use std::cell::Cell;

    const ORACLE: Address = Address::repeat(0xee);
    const X: Address = Address::repeat(1);
    const Y: Address = Address::repeat(2);
    const Z: Address = Address::repeat(3);
    const ETH: u128 = 1_000_000_000_000_000_000;
    const TARGET: u128 = 300_000_000_000;
    const DEADLINE: u64 = 1_759_276_800;

    fn params() -> MarketParams {
        MarketParams {
            price_target: TARGET,
            resolution_timestamp: DEADLINE,
            oracle: ORACLE,
        }
    }

    fn open_market() -> (Market<PriceFeed>, PriceFeed) {
        let feed = PriceFeed::new(ORACLE);
        let market = Market::new(params(), feed.clone()).unwrap();
        (market, feed)
    }

    /// Counts reads and fails on demand
    struct CountingOracle {
        reads: Cell<u32>,
        price: Option<u128>,
    }

    impl PriceOracle for CountingOracle {
        fn address(&self) -> Address {
            ORACLE
        }

        fn latest_price(&self) -> core::result::Result<u128, OracleError> {
            self.reads.set(self.reads.get() + 1);
            self.price.ok_or_else(|| OracleError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn new_market_is_open_and_empty() {
        let (market, _) = open_market();
        assert_eq!(market.state(), MarketState::Open);
        assert_eq!(market.price_target(), TARGET);
        assert_eq!(market.resolution_timestamp(), DEADLINE);
        assert_eq!(market.oracle(), ORACLE);
        assert_eq!(market.final_price(), None);
        assert_eq!(market.winning_position(), None);
        assert_eq!(market.balance(), 0);
    }

    #[test]
    fn rejects_invalid_params() {
        let zero_target = MarketParams { price_target: 0, ..params() };
        assert!(matches!(
            Market::new(zero_target, PriceFeed::new(ORACLE)),
            Err(MarketError::InvalidParams(_))
        ));

        let wrong_oracle = PriceFeed::new(Address::repeat(0x11));
        assert!(matches!(Market::new(params(), wrong_oracle), Err(MarketError::InvalidParams(_))));
    }

    #[test]
    fn place_bet_updates_pools_and_emits() {
        let (mut market, _) = open_market();
        market.place_bet(X, Position::Up, 2 * ETH, DEADLINE - 10).unwrap();
        market.place_bet(Y, Position::Down, ETH, DEADLINE - 5).unwrap();
        market.place_bet(X, Position::Up, ETH, DEADLINE - 1).unwrap();

        assert_eq!(market.total_bets_up(), 3 * ETH);
        assert_eq!(market.total_bets_down(), ETH);
        assert_eq!(market.bets_up(&X), 3 * ETH);
        assert_eq!(market.bets_down(&X), 0);
        assert_eq!(market.bets_down(&Y), ETH);
        assert_eq!(
            market.events()[0],
            MarketEvent::BetPlaced { user: X, position: Position::Up, amount: 2 * ETH }
        );
        assert_eq!(market.events().len(), 3);
    }

    #[test]
    fn bet_at_deadline_is_closed_even_before_resolution() {
        let (mut market, _) = open_market();
        assert_eq!(market.place_bet(X, Position::Up, ETH, DEADLINE), Err(MarketError::MarketClosed));
        assert_eq!(market.place_bet(X, Position::Up, ETH, DEADLINE + 1), Err(MarketError::MarketClosed));
        assert_eq!(market.state(), MarketState::Open);
        assert_eq!(market.balance(), 0);
    }

    #[test]
    fn zero_bet_is_rejected() {
        let (mut market, _) = open_market();
        assert_eq!(market.place_bet(X, Position::Up, 0, 0), Err(MarketError::ZeroAmount));
        assert!(market.events().is_empty());
    }

    #[test]
    fn resolve_before_deadline_is_too_early() {
        let (mut market, feed) = open_market();
        feed.publish(TARGET + 1);
        assert_eq!(
            market.resolve_market(DEADLINE - 1),
            Err(MarketError::TooEarly { now: DEADLINE - 1, resolution_timestamp: DEADLINE })
        );
        assert_eq!(market.state(), MarketState::Open);
    }

    #[test]
    fn resolve_picks_side_by_strict_comparison() {
        assert_eq!(winning_position(TARGET + 1, TARGET), Position::Up);
        assert_eq!(winning_position(TARGET - 1, TARGET), Position::Down);
        assert_eq!(winning_position(TARGET, TARGET), Position::Down);
        assert_eq!(TIE_BREAK_POSITION, Position::Down);
    }

    #[test]
    fn exact_target_resolves_down() {
        let (mut market, feed) = open_market();
        market.place_bet(X, Position::Up, ETH, 0).unwrap();
        market.place_bet(Y, Position::Down, ETH, 0).unwrap();
        feed.publish(TARGET);

        let settlement = market.resolve_market(DEADLINE).unwrap();
        assert_eq!(settlement.winning_position, Position::Down);
        assert_eq!(market.redeem(Y), Ok(2 * ETH));
        assert_eq!(market.redeem(X), Err(MarketError::NothingToClaim));
    }

    #[test]
    fn oracle_is_read_once_per_attempt_and_failure_is_retryable() {
        let oracle = CountingOracle { reads: Cell::new(0), price: None };
        let mut market = Market::new(params(), oracle).unwrap();

        assert_eq!(
            market.resolve_market(DEADLINE),
            Err(MarketError::OracleUnavailable("connection refused".into()))
        );
        assert_eq!(market.price_oracle().reads.get(), 1);
        assert_eq!(market.state(), MarketState::Open);
        assert!(market.events().is_empty());

        // Too early never reaches the oracle
        let oracle = CountingOracle { reads: Cell::new(0), price: Some(TARGET) };
        let mut market = Market::new(params(), oracle).unwrap();
        assert!(market.resolve_market(0).is_err());
        assert_eq!(market.price_oracle().reads.get(), 0);

        market.resolve_market(DEADLINE).unwrap();
        assert_eq!(market.resolve_market(DEADLINE + 1), Err(MarketError::AlreadyResolved));
        assert_eq!(market.price_oracle().reads.get(), 1);
    }

    #[test]
    fn second_resolution_keeps_first_outcome() {
        let (mut market, feed) = open_market();
        feed.publish(TARGET + 5);
        let first = market.resolve_market(DEADLINE).unwrap();

        feed.publish(TARGET - 5);
        assert_eq!(market.resolve_market(DEADLINE + 100), Err(MarketError::AlreadyResolved));
        assert_eq!(market.settlement(), Some(&first));
        assert_eq!(market.final_price(), Some(TARGET + 5));
        assert_eq!(market.winning_position(), Some(Position::Up));
    }

    #[test]
    fn bet_after_resolution_is_closed() {
        let (mut market, feed) = open_market();
        feed.publish(TARGET);
        market.resolve_market(DEADLINE).unwrap();
        assert_eq!(market.place_bet(X, Position::Up, ETH, 0), Err(MarketError::MarketClosed));
    }

    #[test]
    fn redeem_before_resolution_is_rejected() {
        let (mut market, _) = open_market();
        market.place_bet(X, Position::Up, ETH, 0).unwrap();
        assert_eq!(market.redeem(X), Err(MarketError::NotResolved));
        assert_eq!(market.quote_payout(&X), Err(MarketError::NotResolved));
    }

    #[test]
    fn winners_drain_escrow_proportionally() {
        let (mut market, feed) = open_market();
        market.place_bet(X, Position::Up, 3, 0).unwrap();
        market.place_bet(Z, Position::Up, 4, 0).unwrap();
        market.place_bet(Y, Position::Down, 10, 0).unwrap();
        feed.publish(TARGET + 1);
        market.resolve_market(DEADLINE).unwrap();

        // total 17, winning pool 7
        assert_eq!(market.quote_payout(&X), Ok(3 * 17 / 7));
        assert_eq!(market.redeem(X), Ok(7));
        assert_eq!(market.redeem(Z), Ok(9));
        assert_eq!(market.total_paid(), 16);
        assert_eq!(market.balance(), 1);
        assert_eq!(market.dust(), 1);
        assert_eq!(market.total_bets_up(), 0);
        assert_eq!(market.quote_payout(&X), Ok(0));
    }

    #[test]
    fn dust_is_zero_while_winners_outstanding() {
        let (mut market, feed) = open_market();
        market.place_bet(X, Position::Up, 3, 0).unwrap();
        market.place_bet(Z, Position::Up, 4, 0).unwrap();
        market.place_bet(Y, Position::Down, 10, 0).unwrap();
        feed.publish(TARGET + 1);
        market.resolve_market(DEADLINE).unwrap();
        market.redeem(X).unwrap();
        assert_eq!(market.dust(), 0);
    }

    #[test]
    fn empty_winning_side_locks_escrow() {
        let (mut market, feed) = open_market();
        market.place_bet(X, Position::Down, 5 * ETH, 0).unwrap();
        feed.publish(TARGET + 1);
        market.resolve_market(DEADLINE).unwrap();

        assert!(market.is_locked());
        assert_eq!(market.redeem(X), Err(MarketError::NothingToClaim));
        assert_eq!(market.redeem(Y), Err(MarketError::NothingToClaim));
        assert_eq!(market.balance(), 5 * ETH);
        assert_eq!(market.dust(), 0);
    }

    #[test]
    fn snapshot_reflects_query_surface() {
        let (mut market, feed) = open_market();
        market.place_bet(X, Position::Up, 2 * ETH, 0).unwrap();
        market.place_bet(Y, Position::Down, ETH, 0).unwrap();
        feed.publish(320_000_000_000);
        market.resolve_market(DEADLINE).unwrap();
        market.redeem(X).unwrap();

        let snapshot = market.snapshot();
        assert_eq!(snapshot.state, MarketState::Resolved);
        assert_eq!(snapshot.balance, 0);
        assert_eq!(snapshot.total_paid, 3 * ETH);
        assert_eq!(snapshot.depositors.len(), 2);
        assert!(snapshot.depositors[0].redeemed);
        assert!(!snapshot.depositors[1].redeemed);

        let drained = market.drain_events();
        assert_eq!(drained.len(), 4);
        assert!(market.events().is_empty());
    }
}

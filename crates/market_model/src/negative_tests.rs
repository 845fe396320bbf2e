//! Negative tests: every rejected operation leaves the market unchanged
//!
//! Each case snapshots the full query surface plus the event journal, makes
//! a call that must fail, and compares.

#[cfg(test)]
mod tests {
    use crate::*;

    const ORACLE: Address = Address::repeat(0xee);
    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);
    const CAROL: Address = Address::repeat(0xc4);
    const TARGET: u128 = 300_000_000_000;
    const DEADLINE: u64 = 2_000;

    fn market_with_bets() -> (Market<PriceFeed>, PriceFeed) {
        let feed = PriceFeed::new(ORACLE);
        let params = MarketParams {
            price_target: TARGET,
            resolution_timestamp: DEADLINE,
            oracle: ORACLE,
        };
        let mut market = Market::new(params, feed.clone()).unwrap();
        market.place_bet(ALICE, Position::Up, 700, 10).unwrap();
        market.place_bet(BOB, Position::Down, 300, 20).unwrap();
        (market, feed)
    }

    fn resolved_up() -> Market<PriceFeed> {
        let (mut market, feed) = market_with_bets();
        feed.publish(TARGET + 1);
        market.resolve_market(DEADLINE).unwrap();
        market
    }

    fn assert_rejected<T: core::fmt::Debug>(
        market: &mut Market<PriceFeed>,
        expected: MarketError,
        op: impl FnOnce(&mut Market<PriceFeed>) -> Result<T>,
    ) {
        let before = market.snapshot();
        let events_before = market.events().len();

        let err = op(market).unwrap_err();

        assert_eq!(err, expected);
        assert_eq!(market.snapshot(), before, "state changed after {:?}", expected);
        assert_eq!(market.events().len(), events_before, "event emitted after {:?}", expected);
    }

    // ========================================================================
    // Deposits
    // ========================================================================

    #[test]
    fn zero_amount_deposit_rejected() {
        let (mut market, _) = market_with_bets();
        assert_rejected(&mut market, MarketError::ZeroAmount, |m| {
            m.place_bet(CAROL, Position::Up, 0, 30)
        });
        assert_eq!(market.ledger().depositor_count(), 2);
    }

    #[test]
    fn deposit_at_deadline_rejected() {
        let (mut market, _) = market_with_bets();
        assert_rejected(&mut market, MarketError::MarketClosed, |m| {
            m.place_bet(CAROL, Position::Up, 5, DEADLINE)
        });
    }

    #[test]
    fn deposit_after_resolution_rejected() {
        let mut market = resolved_up();
        // Timestamp before the deadline still cannot reopen betting
        assert_rejected(&mut market, MarketError::MarketClosed, |m| {
            m.place_bet(ALICE, Position::Up, 5, 0)
        });
    }

    #[test]
    fn overflowing_deposit_rejected() {
        let (mut market, _) = market_with_bets();
        assert_rejected(&mut market, MarketError::Overflow, |m| {
            m.place_bet(CAROL, Position::Up, u128::MAX - 10, 30)
        });
        assert_eq!(market.bets_up(&CAROL), 0);
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[test]
    fn early_resolution_rejected() {
        let (mut market, feed) = market_with_bets();
        feed.publish(TARGET + 1);
        assert_rejected(
            &mut market,
            MarketError::TooEarly { now: DEADLINE - 1, resolution_timestamp: DEADLINE },
            |m| m.resolve_market(DEADLINE - 1),
        );
    }

    #[test]
    fn oracle_failure_rejected() {
        let (mut market, _feed) = market_with_bets();
        assert_rejected(
            &mut market,
            MarketError::OracleUnavailable("no price has been reported".into()),
            |m| m.resolve_market(DEADLINE),
        );
    }

    #[test]
    fn repeated_resolution_rejected() {
        let mut market = resolved_up();
        assert_rejected(&mut market, MarketError::AlreadyResolved, |m| m.resolve_market(DEADLINE + 1));
    }

    // ========================================================================
    // Redemption
    // ========================================================================

    #[test]
    fn redemption_while_open_rejected() {
        let (mut market, _) = market_with_bets();
        assert_rejected(&mut market, MarketError::NotResolved, |m| m.redeem(ALICE));
    }

    #[test]
    fn loser_redemption_rejected() {
        let mut market = resolved_up();
        assert_rejected(&mut market, MarketError::NothingToClaim, |m| m.redeem(BOB));
    }

    #[test]
    fn stranger_redemption_rejected() {
        let mut market = resolved_up();
        assert_rejected(&mut market, MarketError::NothingToClaim, |m| m.redeem(CAROL));
    }

    #[test]
    fn second_redemption_rejected() {
        let mut market = resolved_up();
        assert_eq!(market.redeem(ALICE), Ok(1_000));
        assert_rejected(&mut market, MarketError::AlreadyRedeemed, |m| m.redeem(ALICE));
    }
}

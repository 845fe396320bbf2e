//! Scenario files: a market definition plus an ordered list of calls
//!
//! Each step is applied the way a transaction would be: a rejected step is
//! recorded and the run continues with the next one.

use anyhow::{Context, Result};
use market_model::{
    Address, Market, MarketEvent, MarketParams, MarketSnapshot, PayoutSink, Position, PriceFeed,
    RedeemError, SharedMarket, TransferError,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

use crate::config::{expand_path, NetworkConfig};
use crate::format::describe_error;
use crate::units::{format_fixed, format_units, parse_units};

/// Oracle identity used when the scenario does not name one
pub const DEFAULT_ORACLE: Address = Address::repeat(0x0a);

pub const TEMPLATE: &str = r#"# Up/Down market scenario
#
# Amounts are in whole currency units (18 decimals), prices in dollars
# (8 decimals). Times are unix seconds.

[market]
price_target = "3000"
resolution_timestamp = 1759276800   # 2025-10-01 00:00:00 UTC
oracle = "0x000000000000000000000000000000000000000a"

[[steps]]
action = "bet"
at = 1759190400
user = "0x1111111111111111111111111111111111111111"
position = "up"
amount = "2"

[[steps]]
action = "bet"
at = 1759194000
user = "0x2222222222222222222222222222222222222222"
position = "down"
amount = "1"

# Too early: rejected
[[steps]]
action = "resolve"
at = 1759190400
price = "3200"

# No price: the oracle is unavailable, resolution can be retried
[[steps]]
action = "resolve"
at = 1759276800

[[steps]]
action = "resolve"
at = 1759276900
price = "3200"

[[steps]]
action = "redeem"
user = "0x1111111111111111111111111111111111111111"

# Losing side: nothing to claim
[[steps]]
action = "redeem"
user = "0x2222222222222222222222222222222222222222"
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub market: MarketSection,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSection {
    /// Decimal price, e.g. `"3000.50"`
    pub price_target: String,
    pub resolution_timestamp: u64,
    #[serde(default = "default_oracle")]
    pub oracle: Address,
}

fn default_oracle() -> Address {
    DEFAULT_ORACLE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Step {
    Bet {
        at: u64,
        user: Address,
        position: Position,
        amount: String,
    },
    /// No `price` means the oracle has nothing to report
    Resolve { at: u64, price: Option<String> },
    Redeem { user: Address },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_path(path);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// In-memory wallet receiving redemptions
#[derive(Default)]
pub struct Wallet {
    transfers: RefCell<Vec<Transfer>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub to: Address,
    pub amount: u128,
}

impl PayoutSink for Wallet {
    fn transfer(&self, to: Address, amount: u128) -> std::result::Result<(), TransferError> {
        self.transfers.borrow_mut().push(Transfer { to, amount });
        Ok(())
    }
}

impl Wallet {
    pub fn into_transfers(self) -> Vec<Transfer> {
        self.transfers.into_inner()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub outcomes: Vec<StepOutcome>,
    pub events: Vec<MarketEvent>,
    pub transfers: Vec<Transfer>,
    pub market: MarketSnapshot,
}

impl Report {
    pub fn rejected(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }
}

/// Build the market and apply every step in order.
///
/// Malformed values (bad decimals, wrong oracle) abort the run; rejections
/// by the market are recorded in the report.
pub fn run(scenario: &Scenario, config: &NetworkConfig) -> Result<Report> {
    let params = MarketParams {
        price_target: parse_units(&scenario.market.price_target, config.price_decimals)
            .context("Invalid price_target")?,
        resolution_timestamp: scenario.market.resolution_timestamp,
        oracle: scenario.market.oracle,
    };
    let feed = PriceFeed::new(params.oracle);
    let market = SharedMarket::new(Market::new(params, feed.clone())?);
    let wallet = Wallet::default();

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let step_no = index + 1;
        let (action, result) = match step {
            Step::Bet { at, user, position, amount } => {
                let amount = parse_units(amount, config.amount_decimals)
                    .with_context(|| format!("Step {}: invalid amount", step_no))?;
                let result = market
                    .place_bet(*user, *position, amount, *at)
                    .map(|()| format!("{} bet {} on {}", user, format_units(amount, config.amount_decimals), position))
                    .map_err(|e| describe_error(&e));
                ("bet", result)
            }
            Step::Resolve { at, price } => {
                match price {
                    Some(text) => {
                        let price = parse_units(text, config.price_decimals)
                            .with_context(|| format!("Step {}: invalid price", step_no))?;
                        feed.publish(price);
                    }
                    None => feed.clear(),
                }
                let result = market
                    .resolve_market(*at)
                    .map(|s| {
                        format!(
                            "final price {}, {} wins",
                            format_fixed(s.final_price, config.price_decimals),
                            s.winning_position
                        )
                    })
                    .map_err(|e| describe_error(&e));
                ("resolve", result)
            }
            Step::Redeem { user } => {
                let result = match market.redeem(*user, &wallet) {
                    Ok(payout) => Ok(format!("{} redeemed {}", user, format_units(payout, config.amount_decimals))),
                    Err(RedeemError::Market(e)) => Err(describe_error(&e)),
                    Err(e) => Err(e.to_string()),
                };
                ("redeem", result)
            }
        };

        log::debug!("step {} {}: {:?}", step_no, action, result);
        outcomes.push(match result {
            Ok(detail) => StepOutcome { step: step_no, action, ok: true, detail },
            Err(detail) => StepOutcome { step: step_no, action, ok: false, detail },
        });
    }

    let events = market.with_mut(|m| m.drain_events());
    Ok(Report {
        outcomes,
        events,
        transfers: wallet.into_transfers(),
        market: market.snapshot(),
    })
}

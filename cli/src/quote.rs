//! Payout calculator
//!
//! Answers "if the market resolved now, what would this stake return?"
//! using the same arithmetic as redemption.

use anyhow::{Context, Result};
use colored::Colorize;
use market_model::{pro_rata_payout, Position};
use serde::Serialize;

use crate::config::NetworkConfig;
use crate::format::{format_amount, format_position};
use crate::units::parse_units;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub side: Position,
    pub stake: u128,
    pub total_pool: u128,
    pub winning_pool: u128,
    pub payout: u128,
    pub profit: u128,
}

/// `stake` is counted as part of the pool on `side`.
pub fn compute(total_up: u128, total_down: u128, stake: u128, side: Position) -> Result<Quote> {
    if stake == 0 {
        anyhow::bail!("stake must be greater than zero");
    }
    let winning_pool = match side {
        Position::Up => total_up,
        Position::Down => total_down,
    };
    if stake > winning_pool {
        anyhow::bail!("stake exceeds the {} pool", side);
    }
    let total_pool = total_up.checked_add(total_down).context("pool total overflows")?;
    let payout = pro_rata_payout(stake, total_pool, winning_pool).context("payout overflows")?;

    Ok(Quote {
        side,
        stake,
        total_pool,
        winning_pool,
        payout,
        profit: payout - stake,
    })
}

pub fn parse_side(text: &str) -> Result<Position> {
    match text.to_ascii_lowercase().as_str() {
        "up" | "0" => Ok(Position::Up),
        "down" | "1" => Ok(Position::Down),
        _ => anyhow::bail!("Invalid side: {}. Use up or down", text),
    }
}

pub fn run_quote(
    config: &NetworkConfig,
    total_up: &str,
    total_down: &str,
    stake: &str,
    side: &str,
    json: bool,
) -> Result<()> {
    let decimals = config.amount_decimals;
    let total_up = parse_units(total_up, decimals).context("Invalid --total-up")?;
    let total_down = parse_units(total_down, decimals).context("Invalid --total-down")?;
    let stake = parse_units(stake, decimals).context("Invalid --stake")?;
    let quote = compute(total_up, total_down, stake, parse_side(side)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    println!("{}", "=== Payout Quote ===".bright_green().bold());
    println!("  {} {}", "Side:".bright_cyan(), format_position(quote.side));
    println!("  {} {}", "Stake:".bright_cyan(), format_amount(config, quote.stake));
    println!("  {} {}", "Total pool:".bright_cyan(), format_amount(config, quote.total_pool));
    println!("  {} {}", "Winning pool:".bright_cyan(), format_amount(config, quote.winning_pool));
    println!("\n  {} {}", "Payout if it wins:".bright_yellow(), format_amount(config, quote.payout));
    println!("  {} {}", "Profit:".bright_yellow(), format_amount(config, quote.profit));
    println!("  {} {}", "If it loses:".dimmed(), format_amount(config, 0));
    Ok(())
}

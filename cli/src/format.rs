//! Display helpers for addresses, amounts, prices and timestamps

use chrono::{TimeZone, Utc};
use colored::Colorize;
use market_model::{Address, MarketError, MarketEvent, MarketSnapshot, MarketState, Position};

use crate::config::NetworkConfig;
use crate::units::{format_fixed, format_units};

/// Shortened address (`0x1111...1111`)
pub fn format_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[0..6], &full[full.len() - 4..])
        .bright_yellow()
        .to_string()
}

pub fn format_amount(config: &NetworkConfig, amount: u128) -> String {
    format!("{} {}", format_units(amount, config.amount_decimals), config.currency_symbol)
}

pub fn format_price(config: &NetworkConfig, price: u128) -> String {
    format!("${}", format_fixed(price, config.price_decimals))
}

/// Unix seconds as UTC (`2025-10-01 00:00:00 UTC`)
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{}s", secs))
}

pub fn format_position(position: Position) -> String {
    match position {
        Position::Up => position.to_string().bright_green().to_string(),
        Position::Down => position.to_string().bright_red().to_string(),
    }
}

pub fn format_event(config: &NetworkConfig, event: &MarketEvent) -> String {
    match event {
        MarketEvent::BetPlaced { user, position, amount } => format!(
            "{} {} {} on {}",
            "BetPlaced".bright_cyan(),
            format_address(user),
            format_amount(config, *amount),
            format_position(*position)
        ),
        MarketEvent::MarketResolved { final_price, winning_position } => format!(
            "{} final price {}, {} wins",
            "MarketResolved".bright_cyan(),
            format_price(config, *final_price),
            format_position(*winning_position)
        ),
        MarketEvent::Redeemed { user, amount } => format!(
            "{} {} received {}",
            "Redeemed".bright_cyan(),
            format_address(user),
            format_amount(config, *amount)
        ),
    }
}

/// One-line explanation of a rejected call, phrased for a depositor
pub fn describe_error(err: &MarketError) -> String {
    match err {
        MarketError::TooEarly { now, resolution_timestamp } => format!(
            "market cannot be resolved before {} (now {})",
            format_timestamp(*resolution_timestamp),
            format_timestamp(*now)
        ),
        other => other.to_string(),
    }
}

pub fn print_snapshot(config: &NetworkConfig, snapshot: &MarketSnapshot) {
    println!("\n{}", "=== Market ===".bright_green().bold());
    println!("  {} {}", "Price target:".bright_cyan(), format_price(config, snapshot.price_target));
    println!(
        "  {} {}",
        "Resolves at:".bright_cyan(),
        format_timestamp(snapshot.resolution_timestamp)
    );
    println!("  {} {}", "Oracle:".bright_cyan(), format_address(&snapshot.oracle));
    let state = match snapshot.state {
        MarketState::Open => "OPEN".bright_green(),
        MarketState::Resolved => "RESOLVED".bright_blue(),
    };
    println!("  {} {}", "State:".bright_cyan(), state);
    println!("  {} {}", "Total UP:".bright_cyan(), format_amount(config, snapshot.total_bets_up));
    println!("  {} {}", "Total DOWN:".bright_cyan(), format_amount(config, snapshot.total_bets_down));
    println!("  {} {}", "Escrow balance:".bright_cyan(), format_amount(config, snapshot.balance));
    println!("  {} {}", "Paid out:".bright_cyan(), format_amount(config, snapshot.total_paid));

    if let Some(settlement) = &snapshot.settlement {
        println!("\n{}", "Settlement:".bright_yellow());
        println!("  {} {}", "Final price:".bright_cyan(), format_price(config, settlement.final_price));
        println!("  {} {}", "Winner:".bright_cyan(), format_position(settlement.winning_position));
        println!("  {} {}", "Total pool:".bright_cyan(), format_amount(config, settlement.total_pool));
        println!("  {} {}", "Winning pool:".bright_cyan(), format_amount(config, settlement.winning_pool));
        println!("  {} {}", "Resolved at:".bright_cyan(), format_timestamp(settlement.resolved_at));
    }
    if snapshot.locked {
        println!(
            "\n  {} nobody bet on the winning side; {} is locked in escrow",
            "⚠️".yellow(),
            format_amount(config, snapshot.balance)
        );
    }
    if snapshot.dust > 0 {
        println!("  {} {} left as rounding dust", "Dust:".bright_cyan(), format_amount(config, snapshot.dust));
    }

    if !snapshot.depositors.is_empty() {
        println!("\n{}", "Depositors:".bright_yellow());
        for depositor in &snapshot.depositors {
            let redeemed = if depositor.redeemed { " (redeemed)".dimmed().to_string() } else { String::new() };
            println!(
                "  {} {} UP {} DOWN {}{}",
                "├─".dimmed(),
                format_address(&depositor.address),
                format_amount(config, depositor.up),
                format_amount(config, depositor.down),
                redeemed
            );
        }
    }
}

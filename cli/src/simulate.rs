//! `simulate`: run a scenario file and print what happened

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::NetworkConfig;
use crate::format::{format_address, format_amount, format_event, print_snapshot};
use crate::scenario::{self, Scenario, TEMPLATE};

pub fn run_simulation(config: &NetworkConfig, path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let report = scenario::run(&scenario, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "=== Simulation ===".bright_green().bold());
    println!("{} {}", "Scenario:".bright_cyan(), path.display());
    println!("{} {} ({})", "Network:".bright_cyan(), config.chain_name, config.chain_id);

    println!("\n{}", "Steps:".bright_yellow());
    for outcome in &report.outcomes {
        let mark = if outcome.ok { "✓".bright_green() } else { "✗".bright_red() };
        println!("  {} {:>2}. {:<8} {}", mark, outcome.step, outcome.action, outcome.detail);
    }

    println!("\n{}", "Events:".bright_yellow());
    if report.events.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for event in &report.events {
        println!("  {} {}", "├─".dimmed(), format_event(config, event));
    }

    if !report.transfers.is_empty() {
        println!("\n{}", "Transfers:".bright_yellow());
        for transfer in &report.transfers {
            println!(
                "  {} {} -> {}",
                "├─".dimmed(),
                format_amount(config, transfer.amount),
                format_address(&transfer.to)
            );
        }
    }

    print_snapshot(config, &report.market);

    let rejected = report.rejected();
    if rejected > 0 {
        println!("\n{} {} step(s) rejected", "ℹ".bright_blue(), rejected);
    }
    Ok(())
}

pub fn print_template() {
    print!("{}", TEMPLATE);
}

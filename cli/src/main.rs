//! Up/Down CLI - simulate and inspect price-target escrow markets
//!
//! Markets run entirely in memory: scenarios describe the deposits,
//! resolution attempts and redemptions, and the CLI reports what the market
//! accepted, what it rejected and where the escrowed value ended up.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod config;
mod format;
mod quote;
mod scenario;
mod simulate;
mod units;

use config::NetworkConfig;

#[derive(Parser)]
#[command(name = "updown")]
#[command(about = "Up/Down market CLI - simulate price-target escrow markets", long_about = None)]
#[command(version)]
struct Cli {
    /// Network preset for display units (local, base, bsc, optimism, celo, arbitrum)
    #[arg(short, long, default_value = "local")]
    network: String,

    /// TOML file overriding display settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file against a fresh market
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,
    },

    /// Compute what a stake would pay if its side wins
    Quote {
        /// Amount currently on UP (whole currency units)
        #[arg(long)]
        total_up: String,

        /// Amount currently on DOWN (whole currency units)
        #[arg(long)]
        total_down: String,

        /// Your stake, already included in its side's total
        #[arg(long)]
        stake: String,

        /// Side of the stake (up or down)
        #[arg(long)]
        side: String,
    },

    /// Print a sample scenario file
    Template,

    /// Run the built-in self-check suite
    Check,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = NetworkConfig::new(&cli.network, cli.config.clone())?;

    if cli.verbose {
        println!("{} {}", "Network:".bright_cyan(), config.describe());
        println!(
            "{} {} with {} decimals",
            "Currency:".bright_cyan(),
            config.currency_symbol,
            config.amount_decimals
        );
        if let Some(path) = &config.config_path {
            println!("{} {}", "Config:".bright_cyan(), path.display());
        }
    }

    match cli.command {
        Commands::Simulate { scenario } => {
            simulate::run_simulation(&config, &scenario, cli.json)?;
        }
        Commands::Quote { total_up, total_down, stake, side } => {
            quote::run_quote(&config, &total_up, &total_down, &stake, &side, cli.json)?;
        }
        Commands::Template => {
            simulate::print_template();
        }
        Commands::Check => {
            tests::run_checks(&config)?;
        }
    }

    Ok(())
}

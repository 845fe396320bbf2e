//! Network presets and display configuration
//!
//! A network only selects how amounts are shown (currency symbol and
//! decimals); markets always run in memory.

use anyhow::{Context, Result};
use market_model::{AMOUNT_DECIMALS, PRICE_DECIMALS};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::units::MAX_DECIMALS;

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: String,
    pub chain_name: String,
    pub chain_id: u64,
    pub currency_symbol: String,
    pub amount_decimals: u32,
    pub price_decimals: u32,
    pub config_path: Option<PathBuf>,
}

/// Optional TOML overrides (`--config`)
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    display: DisplayOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplayOverrides {
    currency_symbol: Option<String>,
    amount_decimals: Option<u32>,
    price_decimals: Option<u32>,
}

impl NetworkConfig {
    pub fn new(network: &str, config_path: Option<PathBuf>) -> Result<Self> {
        let (chain_name, chain_id, symbol) = match network {
            "local" | "localnet" | "anvil" => ("Local devnet", 31337, "ETH"),
            "base" => ("Base", 8453, "ETH"),
            "bsc" => ("BNB Smart Chain", 56, "BNB"),
            "optimism" | "op" => ("OP Mainnet", 10, "ETH"),
            "celo" => ("Celo", 42220, "CELO"),
            "arbitrum" => ("Arbitrum One", 42161, "ETH"),
            _ => anyhow::bail!(
                "Unknown network: {}. Use local, base, bsc, optimism, celo, or arbitrum",
                network
            ),
        };

        let mut config = Self {
            network: network.to_string(),
            chain_name: chain_name.to_string(),
            chain_id,
            currency_symbol: symbol.to_string(),
            amount_decimals: AMOUNT_DECIMALS,
            price_decimals: PRICE_DECIMALS,
            config_path: None,
        };

        if let Some(path) = config_path {
            let path = expand_path(&path);
            config.apply_file(&path)?;
            config.config_path = Some(path);
        }

        Ok(config)
    }

    /// `base: Base (chain 8453)`
    pub fn describe(&self) -> String {
        format!("{}: {} (chain {})", self.network, self.chain_name, self.chain_id)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let display = file.display;
        if let Some(symbol) = display.currency_symbol {
            self.currency_symbol = symbol;
        }
        if let Some(decimals) = display.amount_decimals {
            self.amount_decimals = check_decimals("amount_decimals", decimals)?;
        }
        if let Some(decimals) = display.price_decimals {
            self.price_decimals = check_decimals("price_decimals", decimals)?;
        }
        Ok(())
    }
}

fn check_decimals(field: &str, decimals: u32) -> Result<u32> {
    if decimals > MAX_DECIMALS {
        anyhow::bail!("{} must be at most {}, got {}", field, MAX_DECIMALS, decimals);
    }
    Ok(decimals)
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&text).into_owned())
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: General,
    pub server: Server,
    pub polymarket: Polymarket,
    pub analysis: Analysis,
    pub scoring: Scoring,
    pub cache: Cache,
    pub observability: Option<Observability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Polymarket {
    pub data_api_url: String,
    pub gamma_api_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    /// Ranked wallets handed to the signal generator.
    pub top_n: usize,
    pub holders_limit: u32,
    pub positions_limit: u32,
    pub activity_limit: u32,
    /// Wallets enriched concurrently per batch.
    pub enrichment_batch_size: usize,
    pub min_position_usd: f64,
    pub min_profit_usd: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scoring {
    /// Markets traded at which win-rate credit stops being discounted.
    pub win_rate_full_weight_markets: u32,
    pub volume_sweet_spot_low: u32,
    pub volume_sweet_spot_high: u32,
    /// Volume points awarded above the sweet spot (likely automated wallets).
    pub volume_high_frequency_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
    pub market_ttl_secs: u64,
    pub wallet_ttl_secs: u64,
    pub max_entries: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Observability {
    pub prometheus_port: u16,
}

impl Config {
    /// Load from `CONFIG_PATH` if set, else `config/default.toml`.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}

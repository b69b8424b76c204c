use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the market a wallet currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Yes,
    No,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// One wallet holding an outcome token.
#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    pub address: String,
    pub shares: f64,
    pub name: Option<String>,
}

/// Holders of a single outcome token.
#[derive(Debug, Clone, PartialEq)]
pub struct HolderListing {
    pub token_id: String,
    pub holders: Vec<Holder>,
}

/// Holder resolved to a side and a dollar size, before history enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialWallet {
    /// Lowercased.
    pub address: String,
    pub name: Option<String>,
    pub position: Position,
    pub position_size: f64,
    pub share_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletProfile {
    pub address: String,
    pub name: Option<String>,
    pub total_profit: f64,
    pub total_markets: u32,
    /// Percent, 0..=100.
    pub win_rate: f64,
    pub sampled_position_count: u32,
    /// Unix epoch means unknown.
    pub last_trade: DateTime<Utc>,
    pub avg_position_size: f64,
    pub current_position: Position,
    pub current_position_size: f64,
    pub current_share_count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub profit: f64,
    pub win_rate: f64,
    pub volume: f64,
    pub recency: f64,
    pub conviction: f64,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> f64 {
        self.profit + self.win_rate + self.volume + self.recency + self.conviction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWallet {
    pub profile: WalletProfile,
    pub breakdown: ScoreBreakdown,
    /// 0..=100.
    pub score: f64,
}

impl ScoredWallet {
    /// Position size scaled by the credibility fraction.
    pub fn weighted_value(&self) -> f64 {
        self.profile.current_position_size * (self.score / 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    BuyYes,
    BuyNo,
    Inconclusive,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyYes => "BUY_YES",
            Self::BuyNo => "BUY_NO",
            Self::Inconclusive => "INCONCLUSIVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub address: String,
    pub name: Option<String>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub position: Position,
    pub position_size: f64,
    pub weighted_value: f64,
    pub total_profit: f64,
    pub win_rate: f64,
    pub total_markets: u32,
}

impl From<&ScoredWallet> for WalletSummary {
    fn from(w: &ScoredWallet) -> Self {
        Self {
            address: w.profile.address.clone(),
            name: w.profile.name.clone(),
            score: w.score,
            breakdown: w.breakdown,
            position: w.profile.current_position,
            position_size: w.profile.current_position_size,
            weighted_value: w.weighted_value(),
            total_profit: w.profile.total_profit,
            win_rate: w.profile.win_rate,
            total_markets: w.profile.total_markets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalData {
    pub total_wallets: usize,
    pub yes_count: usize,
    pub no_count: usize,
    pub yes_raw_usd: f64,
    pub no_raw_usd: f64,
    pub yes_weighted_usd: f64,
    pub no_weighted_usd: f64,
    pub yes_share: f64,
    pub whale_detected: bool,
    pub whale_address: Option<String>,
    pub top_wallets: Vec<WalletSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSignal {
    pub signal: Signal,
    /// 0..=10.
    pub confidence: u8,
    pub reasoning: String,
    pub data: Option<SignalData>,
}

impl TradingSignal {
    pub fn inconclusive(reasoning: impl Into<String>) -> Self {
        Self {
            signal: Signal::Inconclusive,
            confidence: 0,
            reasoning: reasoning.into(),
            data: None,
        }
    }
}

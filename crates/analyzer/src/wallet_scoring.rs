use chrono::{DateTime, Utc};

use crate::types::{ScoreBreakdown, ScoredWallet, WalletProfile};

pub const PROFIT_MAX: f64 = 40.0;
pub const WIN_RATE_MAX: f64 = 25.0;
pub const VOLUME_MAX: f64 = 15.0;
pub const RECENCY_MAX: f64 = 10.0;
pub const CONVICTION_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct ScoringParams {
    /// Markets needed before win rate counts at full weight.
    pub win_rate_full_weight_markets: u32,
    pub volume_sweet_spot_low: u32,
    pub volume_sweet_spot_high: u32,
    /// Volume points above the sweet spot.
    pub volume_high_frequency_score: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            win_rate_full_weight_markets: 20,
            volume_sweet_spot_low: 20,
            volume_sweet_spot_high: 200,
            volume_high_frequency_score: 12.0,
        }
    }
}

impl From<&common::config::Scoring> for ScoringParams {
    fn from(cfg: &common::config::Scoring) -> Self {
        Self {
            win_rate_full_weight_markets: cfg.win_rate_full_weight_markets,
            volume_sweet_spot_low: cfg.volume_sweet_spot_low,
            volume_sweet_spot_high: cfg.volume_sweet_spot_high,
            volume_high_frequency_score: cfg.volume_high_frequency_score,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn clamp(x: f64, max: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, max)
    }
}

pub fn profit_score(total_profit: f64) -> f64 {
    if total_profit.is_nan() || total_profit <= 0.0 {
        return 0.0;
    }
    // $1k => 0, $10k => 13, $100k => 26, $1M => 39.
    clamp(13.0 * (total_profit / 1000.0).log10(), PROFIT_MAX)
}

pub fn win_rate_score(win_rate: f64, total_markets: u32, full_weight_markets: u32) -> f64 {
    if total_markets == 0 {
        return 0.0;
    }
    let sample_weight = if full_weight_markets == 0 {
        1.0
    } else {
        (f64::from(total_markets) / f64::from(full_weight_markets)).min(1.0)
    };
    clamp((win_rate / 100.0) * WIN_RATE_MAX * sample_weight, WIN_RATE_MAX)
}

pub fn volume_score(total_markets: u32, params: &ScoringParams) -> f64 {
    let low = params.volume_sweet_spot_low;
    if total_markets == 0 {
        0.0
    } else if total_markets <= low {
        VOLUME_MAX * f64::from(total_markets) / f64::from(low.max(1))
    } else if total_markets <= params.volume_sweet_spot_high {
        VOLUME_MAX
    } else {
        clamp(params.volume_high_frequency_score, VOLUME_MAX)
    }
}

pub fn recency_score(last_trade: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - last_trade).num_seconds() as f64 / 86_400.0;
    if days <= 7.0 {
        RECENCY_MAX
    } else if days <= 30.0 {
        7.0
    } else if days <= 90.0 {
        4.0
    } else {
        0.0
    }
}

pub fn conviction_score(current_position_size: f64, avg_position_size: f64) -> f64 {
    if current_position_size.is_nan()
        || avg_position_size.is_nan()
        || current_position_size <= 0.0
        || avg_position_size <= 0.0
    {
        return 0.0;
    }
    clamp(5.0 * current_position_size / avg_position_size, CONVICTION_MAX)
}

/// Five-factor breakdown; components rounded to cents.
pub fn score_breakdown(p: &WalletProfile, params: &ScoringParams, now: DateTime<Utc>) -> ScoreBreakdown {
    ScoreBreakdown {
        profit: round2(profit_score(p.total_profit)),
        win_rate: round2(win_rate_score(
            p.win_rate,
            p.total_markets,
            params.win_rate_full_weight_markets,
        )),
        volume: round2(volume_score(p.total_markets, params)),
        recency: round2(recency_score(p.last_trade, now)),
        conviction: round2(conviction_score(p.current_position_size, p.avg_position_size)),
    }
}

pub fn score_wallet(profile: WalletProfile, params: &ScoringParams, now: DateTime<Utc>) -> ScoredWallet {
    let breakdown = score_breakdown(&profile, params, now);
    let score = round2(breakdown.sum()).clamp(0.0, 100.0);
    ScoredWallet {
        profile,
        breakdown,
        score,
    }
}

/// Score and rank by score descending, keeping the best `top_n`.
/// Ties keep their input order.
pub fn rank_wallets(
    profiles: Vec<WalletProfile>,
    params: &ScoringParams,
    now: DateTime<Utc>,
    top_n: usize,
) -> Vec<ScoredWallet> {
    let mut scored: Vec<ScoredWallet> = profiles
        .into_iter()
        .map(|p| score_wallet(p, params, now))
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}

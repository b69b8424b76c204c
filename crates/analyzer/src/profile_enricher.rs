use chrono::{DateTime, Utc};
use common::cache::{get_json, set_json, ResponseCache};
use common::error::ApiError;
use common::types::{ActivityEvent, HistoricalPosition, LeaderboardEntry};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sources::WalletHistoryFetcher;
use crate::types::{PartialWallet, WalletProfile};

/// Summed position PnL beyond this magnitude is treated as corrupt.
pub const PROFIT_SANITY_CEILING: f64 = 50_000_000.0;
/// Average position size beyond this is treated as corrupt.
pub const AVG_POSITION_SANITY_CEILING: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy)]
pub struct EnrichmentSettings {
    pub positions_limit: u32,
    pub activity_limit: u32,
    pub batch_size: usize,
    pub history_ttl: Duration,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            positions_limit: 50,
            activity_limit: 5,
            batch_size: 5,
            history_ttl: Duration::from_secs(300),
        }
    }
}

/// Raw history for one wallet. A `None` source either failed or was never fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletHistory {
    pub leaderboard: Option<LeaderboardEntry>,
    pub positions: Option<Vec<HistoricalPosition>>,
    pub activity: Option<Vec<ActivityEvent>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileFlags {
    pub leaderboard_mismatch: bool,
    pub profit_discarded: bool,
    pub avg_size_discarded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Same order as the input wallets.
    pub profiles: Vec<WalletProfile>,
    pub blank_profiles: usize,
    pub leaderboard_mismatches: usize,
    pub profit_discards: usize,
    pub avg_size_discards: usize,
    pub failed_fetches: usize,
    pub cache_hits: usize,
}

impl EnrichmentReport {
    pub fn warnings(&self) -> Vec<String> {
        let total = self.profiles.len();
        let mut out = Vec::new();
        if self.blank_profiles > 0 {
            out.push(format!(
                "{} of {total} wallets have no trading history (zero markets and zero profit)",
                self.blank_profiles
            ));
        }
        if self.leaderboard_mismatches > 0 {
            out.push(format!(
                "{} leaderboard entries belonged to a different wallet and were ignored",
                self.leaderboard_mismatches
            ));
        }
        if self.profit_discards > 0 {
            out.push(format!(
                "{} wallets reported implausible position PnL; profit set to 0",
                self.profit_discards
            ));
        }
        if self.avg_size_discards > 0 {
            out.push(format!(
                "{} wallets reported implausible position sizes; average size set to 0",
                self.avg_size_discards
            ));
        }
        if self.failed_fetches > 0 {
            out.push(format!(
                "{} wallet history requests failed; affected profiles are partial",
                self.failed_fetches
            ));
        }
        out
    }
}

/// Enrich wallets in batches of `settings.batch_size`, each batch fetched concurrently.
pub async fn enrich_wallets<F, C>(
    fetcher: &F,
    cache: &C,
    wallets: &[PartialWallet],
    settings: &EnrichmentSettings,
    now: DateTime<Utc>,
) -> EnrichmentReport
where
    F: WalletHistoryFetcher + Sync,
    C: ResponseCache,
{
    let mut report = EnrichmentReport::default();

    for batch in wallets.chunks(settings.batch_size.max(1)) {
        let loaded = join_all(
            batch
                .iter()
                .map(|w| load_history(fetcher, cache, &w.address, settings)),
        )
        .await;

        for (wallet, (history, failed, cached)) in batch.iter().zip(loaded) {
            let (profile, flags) = reconcile(wallet, &history, now);
            report.failed_fetches += failed;
            report.cache_hits += usize::from(cached);
            report.leaderboard_mismatches += usize::from(flags.leaderboard_mismatch);
            report.profit_discards += usize::from(flags.profit_discarded);
            report.avg_size_discards += usize::from(flags.avg_size_discarded);
            if is_blank(&profile) {
                report.blank_profiles += 1;
            }
            report.profiles.push(profile);
        }
    }

    metrics::counter!("analyzer_wallets_enriched_total").increment(report.profiles.len() as u64);
    metrics::counter!("analyzer_blank_profiles_total").increment(report.blank_profiles as u64);
    tracing::info!(
        wallets = report.profiles.len(),
        blank = report.blank_profiles,
        failed_fetches = report.failed_fetches,
        cache_hits = report.cache_hits,
        "wallets enriched"
    );
    report
}

fn is_blank(p: &WalletProfile) -> bool {
    p.total_markets == 0 && p.total_profit == 0.0
}

/// Cached history, or a fresh fetch. Only fully successful fetches are cached.
/// Returns the history, the number of failed sources and whether it came from cache.
async fn load_history<F, C>(
    fetcher: &F,
    cache: &C,
    address: &str,
    settings: &EnrichmentSettings,
) -> (WalletHistory, usize, bool)
where
    F: WalletHistoryFetcher + Sync,
    C: ResponseCache,
{
    let key = format!("wallet:{address}");
    if let Some(history) = get_json::<C, WalletHistory>(cache, &key).await {
        metrics::counter!("analyzer_cache_hits_total", "cache" => "wallet").increment(1);
        return (history, 0, true);
    }
    metrics::counter!("analyzer_cache_misses_total", "cache" => "wallet").increment(1);

    let (history, failed) = fetch_history(fetcher, address, settings).await;
    if failed == 0 {
        set_json(cache, &key, &history, settings.history_ttl).await;
    }
    (history, failed, false)
}

async fn fetch_history<F>(
    fetcher: &F,
    address: &str,
    settings: &EnrichmentSettings,
) -> (WalletHistory, usize)
where
    F: WalletHistoryFetcher + Sync,
{
    let (leaderboard, positions, activity) = tokio::join!(
        fetcher.leaderboard_entry(address),
        fetcher.recent_positions(address, settings.positions_limit),
        fetcher.recent_activity(address, settings.activity_limit),
    );

    let mut failed = 0;
    let history = WalletHistory {
        leaderboard: settle("leaderboard", address, leaderboard, &mut failed).flatten(),
        positions: settle("positions", address, positions, &mut failed),
        activity: settle("activity", address, activity, &mut failed),
    };
    (history, failed)
}

fn settle<T>(
    source: &'static str,
    address: &str,
    res: Result<T, ApiError>,
    failed: &mut usize,
) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            *failed += 1;
            tracing::warn!(wallet = address, source, error = %e, "wallet history fetch failed");
            None
        }
    }
}

/// Merge the three history sources into a profile.
pub fn reconcile(
    wallet: &PartialWallet,
    history: &WalletHistory,
    now: DateTime<Utc>,
) -> (WalletProfile, ReconcileFlags) {
    let mut flags = ReconcileFlags::default();
    let positions = history.positions.as_deref().unwrap_or(&[]);

    let leaderboard = history.leaderboard.as_ref().filter(|e| {
        e.wallet
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case(&wallet.address))
    });
    if history.leaderboard.is_some() && leaderboard.is_none() {
        flags.leaderboard_mismatch = true;
        tracing::debug!(wallet = %wallet.address, "leaderboard row belongs to another wallet");
    }

    let total_profit = match leaderboard.and_then(|e| e.pnl) {
        Some(pnl) => pnl,
        None => {
            let sum: f64 = positions.iter().filter_map(|p| p.realized_pnl).sum();
            if !sum.is_finite() || sum.abs() > PROFIT_SANITY_CEILING {
                flags.profit_discarded = true;
                0.0
            } else {
                sum
            }
        }
    };

    let total_markets = leaderboard
        .and_then(|e| e.markets_traded)
        .unwrap_or(positions.len() as u32);

    let win_rate = if positions.is_empty() {
        0.0
    } else {
        let wins = positions
            .iter()
            .filter(|p| p.realized_pnl.is_some_and(|pnl| pnl > 0.0))
            .count();
        wins as f64 / positions.len() as f64 * 100.0
    };

    // Positions without a reported size count as zero.
    let mut avg_position_size = if positions.is_empty() {
        0.0
    } else {
        let total: f64 = positions
            .iter()
            .filter_map(HistoricalPosition::size)
            .map(f64::abs)
            .sum();
        total / positions.len() as f64
    };
    if !avg_position_size.is_finite() || avg_position_size > AVG_POSITION_SANITY_CEILING {
        flags.avg_size_discarded = true;
        avg_position_size = 0.0;
    }

    let activity = history.activity.as_deref().unwrap_or(&[]);
    let last_trade = match activity.iter().filter_map(|a| a.timestamp).max() {
        Some(ts) => ts,
        // Events with unreadable times still count as recent activity.
        None if !activity.is_empty() || !positions.is_empty() => now,
        None => DateTime::<Utc>::default(),
    };

    let name = wallet
        .name
        .clone()
        .or_else(|| leaderboard.and_then(|e| e.name.clone()));

    let profile = WalletProfile {
        address: wallet.address.clone(),
        name,
        total_profit,
        total_markets,
        win_rate,
        sampled_position_count: positions.len() as u32,
        last_trade,
        avg_position_size,
        current_position: wallet.position,
        current_position_size: wallet.position_size,
        current_share_count: wallet.share_count,
    };
    (profile, flags)
}

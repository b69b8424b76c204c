//! In-memory collaborators for unit tests.

use common::error::ApiError;
use common::market_url::MarketRef;
use common::types::{ActivityEvent, HistoricalPosition, LeaderboardEntry};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::AnalysisError;
use crate::market::MarketContext;
use crate::sources::{HoldersFetcher, MarketResolver, WalletHistoryFetcher};
use crate::types::{Holder, HolderListing};

#[derive(Default)]
pub struct FakeSource {
    pub market: Option<MarketContext>,
    /// Simulated latency of market resolution.
    pub market_delay: Option<Duration>,
    pub listings: Vec<HolderListing>,
    /// HTTP status the holders endpoint fails with.
    pub holders_status: Option<u16>,
    pub leaderboard: HashMap<String, LeaderboardEntry>,
    pub positions: HashMap<String, Vec<HistoricalPosition>>,
    pub activity: HashMap<String, Vec<ActivityEvent>>,
    /// Simulated latency of every wallet history fetch.
    pub history_delay: Option<Duration>,
    /// Wallets whose leaderboard endpoint fails.
    pub failing_leaderboard: HashSet<String>,
    /// Wallets whose positions endpoint fails.
    pub failing_positions: HashSet<String>,
    /// Wallets whose activity endpoint fails.
    pub failing_activity: HashSet<String>,
    pub market_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn market_calls(&self) -> usize {
        self.market_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Most history fetches observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn history_fetch(
        &self,
        endpoint: &'static str,
        address: &str,
        failing: &HashSet<String>,
    ) -> Result<(), ApiError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.history_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if failing.contains(address) {
            return Err(ApiError::Status {
                endpoint,
                status: 500,
            });
        }
        Ok(())
    }
}

impl MarketResolver for FakeSource {
    async fn resolve_market(&self, market: &MarketRef) -> Result<MarketContext, AnalysisError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.market_delay {
            tokio::time::sleep(delay).await;
        }
        self.market
            .clone()
            .ok_or_else(|| AnalysisError::NotFound(format!("market {}", market.slug())))
    }
}

impl HoldersFetcher for FakeSource {
    async fn fetch_holder_listings(
        &self,
        condition_id: &str,
        _limit: u32,
    ) -> Result<Vec<HolderListing>, ApiError> {
        match self.holders_status {
            Some(status) => Err(ApiError::from_status("holders", status, condition_id)),
            None => Ok(self.listings.clone()),
        }
    }
}

impl WalletHistoryFetcher for FakeSource {
    async fn leaderboard_entry(&self, address: &str) -> Result<Option<LeaderboardEntry>, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_fetch("leaderboard", address, &self.failing_leaderboard)
            .await?;
        Ok(self.leaderboard.get(address).cloned())
    }

    async fn recent_positions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalPosition>, ApiError> {
        self.history_fetch("positions", address, &self.failing_positions)
            .await?;
        Ok(self
            .positions
            .get(address)
            .map(|p| p.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_activity(&self, address: &str, limit: u32) -> Result<Vec<ActivityEvent>, ApiError> {
        self.history_fetch("activity", address, &self.failing_activity)
            .await?;
        Ok(self
            .activity
            .get(address)
            .map(|a| a.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }
}

pub fn yes_no_market() -> MarketContext {
    MarketContext {
        event_slug: Some("will-it-rain".into()),
        market_slug: Some("will-it-rain".into()),
        question: "Will it rain tomorrow?".into(),
        condition_id: "0xcond".into(),
        outcomes: vec!["Yes".into(), "No".into()],
        prices: HashMap::from([("Yes".to_string(), 0.5), ("No".to_string(), 0.5)]),
        token_outcomes: HashMap::from([
            ("111".to_string(), "Yes".to_string()),
            ("222".to_string(), "No".to_string()),
        ]),
    }
}

pub fn listing(token: &str, holders: &[(&str, f64)]) -> HolderListing {
    HolderListing {
        token_id: token.to_string(),
        holders: holders
            .iter()
            .map(|(addr, shares)| Holder {
                address: (*addr).to_string(),
                shares: *shares,
                name: None,
            })
            .collect(),
    }
}

pub fn winning_positions(n: usize, pnl: f64, size: f64) -> Vec<HistoricalPosition> {
    (0..n)
        .map(|_| HistoricalPosition {
            realized_pnl: Some(pnl),
            initial_value: Some(size),
            current_value: None,
        })
        .collect()
}

/// Five credible YES holders and one blank NO holder on [`yes_no_market`].
pub fn smart_money_source() -> FakeSource {
    let mut source = FakeSource {
        market: Some(yes_no_market()),
        listings: vec![
            listing(
                "111",
                &[
                    ("0xA1", 2000.0),
                    ("0xa2", 2000.0),
                    ("0xa3", 2000.0),
                    ("0xa4", 2000.0),
                    ("0xa5", 2000.0),
                ],
            ),
            listing("222", &[("0xb1", 400.0)]),
        ],
        ..FakeSource::default()
    };
    for addr in ["0xa1", "0xa2", "0xa3", "0xa4", "0xa5"] {
        source
            .positions
            .insert(addr.to_string(), winning_positions(30, 500.0, 800.0));
    }
    source
}

use common::error::ApiError;
use common::market_url::MarketRef;
use common::types::{ActivityEvent, HistoricalPosition, LeaderboardEntry};

use crate::error::AnalysisError;
use crate::market::MarketContext;
use crate::types::HolderListing;

pub trait MarketResolver {
    fn resolve_market(
        &self,
        market: &MarketRef,
    ) -> impl std::future::Future<Output = Result<MarketContext, AnalysisError>> + Send;
}

pub trait HoldersFetcher {
    /// One listing per outcome token, at most `limit` holders each.
    fn fetch_holder_listings(
        &self,
        condition_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<HolderListing>, ApiError>> + Send;
}

/// Three independent, independently fallible views of a wallet's history.
pub trait WalletHistoryFetcher {
    /// The returned row is not guaranteed to belong to `address`.
    fn leaderboard_entry(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = Result<Option<LeaderboardEntry>, ApiError>> + Send;

    fn recent_positions(
        &self,
        address: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<HistoricalPosition>, ApiError>> + Send;

    fn recent_activity(
        &self,
        address: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ActivityEvent>, ApiError>> + Send;
}

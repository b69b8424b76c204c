use common::error::ApiError;
use common::market_url::MarketRef;
use common::polymarket::PolymarketClient;
use common::types::{ActivityEvent, ApiHolderResponse, HistoricalPosition, LeaderboardEntry};
use std::future::Future;
use std::time::Instant;

use super::fetcher_traits::*;
use crate::error::AnalysisError;
use crate::market::MarketContext;
use crate::types::{Holder, HolderListing};

/// Await `fut`, recording latency and outcome counters for `endpoint`.
async fn instrumented<T, F>(endpoint: &'static str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let start = Instant::now();
    let res = fut.await;
    let ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("analyzer_api_latency_ms", "endpoint" => endpoint).record(ms);
    match &res {
        Ok(_) => {
            metrics::counter!("analyzer_api_requests_total", "endpoint" => endpoint, "status" => "ok")
                .increment(1);
        }
        Err(e) => {
            metrics::counter!("analyzer_api_requests_total", "endpoint" => endpoint, "status" => "error")
                .increment(1);
            metrics::counter!(
                "analyzer_api_errors_total",
                "endpoint" => endpoint,
                "kind" => e.kind().as_str()
            )
            .increment(1);
        }
    }
    res
}

impl MarketResolver for PolymarketClient {
    async fn resolve_market(&self, market: &MarketRef) -> Result<MarketContext, AnalysisError> {
        match market {
            MarketRef::Event {
                event_slug,
                market_slug,
            } => {
                let event = instrumented("gamma_events", self.fetch_event(event_slug)).await?;
                MarketContext::from_gamma(&event, market_slug.as_deref())
            }
            MarketRef::Market { slug } => {
                let found = instrumented("gamma_markets", self.fetch_market(slug)).await?;
                MarketContext::from_standalone(&found)
            }
        }
    }
}

impl HoldersFetcher for PolymarketClient {
    async fn fetch_holder_listings(
        &self,
        condition_id: &str,
        limit: u32,
    ) -> Result<Vec<HolderListing>, ApiError> {
        let raw = instrumented("holders", self.fetch_holders(condition_id, limit)).await?;
        Ok(raw.into_iter().filter_map(to_listing).collect())
    }
}

impl WalletHistoryFetcher for PolymarketClient {
    async fn leaderboard_entry(&self, address: &str) -> Result<Option<LeaderboardEntry>, ApiError> {
        instrumented("leaderboard", self.fetch_leaderboard_entry(address)).await
    }

    async fn recent_positions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalPosition>, ApiError> {
        instrumented("positions", self.fetch_positions(address, limit)).await
    }

    async fn recent_activity(&self, address: &str, limit: u32) -> Result<Vec<ActivityEvent>, ApiError> {
        instrumented("activity", self.fetch_activity(address, limit)).await
    }
}

/// Listings without a token id and holders without a wallet are dropped.
fn to_listing(resp: ApiHolderResponse) -> Option<HolderListing> {
    let token_id = resp.token.filter(|t| !t.is_empty())?;
    let holders = resp
        .holders
        .into_iter()
        .filter_map(|h| {
            let address = h.proxy_wallet.filter(|w| !w.is_empty())?;
            Some(Holder {
                address,
                shares: h.amount.filter(|a| a.is_finite()).unwrap_or(0.0).max(0.0),
                name: h.name.filter(|n| !n.is_empty()).or(h.pseudonym),
            })
        })
        .collect();
    Some(HolderListing { token_id, holders })
}

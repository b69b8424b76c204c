use chrono::{DateTime, Utc};
use common::cache::{get_json, set_json, ResponseCache};
use common::config::Config;
use common::market_url::{parse_market_url, MarketRef};
use serde::Serialize;
use std::time::Duration;

use crate::error::AnalysisError;
use crate::market::{MarketContext, MarketSummary};
use crate::position_mapper::map_holder_listings;
use crate::profile_enricher::{enrich_wallets, EnrichmentSettings};
use crate::qualification::{filter_qualified, QualificationFloors};
use crate::signal::{fmt_usd, generate_signal};
use crate::sources::{HoldersFetcher, MarketResolver, WalletHistoryFetcher};
use crate::types::{HolderListing, TradingSignal};
use crate::wallet_scoring::{rank_wallets, ScoringParams};

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub top_n: usize,
    pub holders_limit: u32,
    pub enrichment: EnrichmentSettings,
    pub floors: QualificationFloors,
    pub scoring: ScoringParams,
    pub market_ttl: Duration,
    pub timeout: Duration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: 20,
            holders_limit: 20,
            enrichment: EnrichmentSettings::default(),
            floors: QualificationFloors::default(),
            scoring: ScoringParams::default(),
            market_ttl: Duration::from_secs(60),
            timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for AnalysisSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            top_n: cfg.analysis.top_n,
            holders_limit: cfg.analysis.holders_limit,
            enrichment: EnrichmentSettings {
                positions_limit: cfg.analysis.positions_limit,
                activity_limit: cfg.analysis.activity_limit,
                batch_size: cfg.analysis.enrichment_batch_size,
                history_ttl: Duration::from_secs(cfg.cache.wallet_ttl_secs),
            },
            floors: QualificationFloors::from(&cfg.analysis),
            scoring: ScoringParams::from(&cfg.scoring),
            market_ttl: Duration::from_secs(cfg.cache.market_ttl_secs),
            timeout: Duration::from_secs(cfg.analysis.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub signal: TradingSignal,
    /// Data-quality notes, in the order they were raised.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub market: MarketSummary,
    pub signal: TradingSignal,
    pub warnings: Vec<String>,
}

/// Runs the mapper, enricher, filter, scorer and signal generator over one market.
pub struct Analyzer<S, C> {
    source: S,
    cache: C,
    settings: AnalysisSettings,
}

impl<S, C> Analyzer<S, C> {
    pub fn new(source: S, cache: C, settings: AnalysisSettings) -> Self {
        Self {
            source,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }
}

impl<S, C> Analyzer<S, C>
where
    S: WalletHistoryFetcher + Sync,
    C: ResponseCache,
{
    pub async fn analyze(
        &self,
        market: &MarketContext,
        listings: &[HolderListing],
    ) -> Result<AnalysisOutcome, AnalysisError> {
        self.analyze_at(market, listings, Utc::now()).await
    }

    /// `analyze` against a fixed clock.
    pub async fn analyze_at(
        &self,
        market: &MarketContext,
        listings: &[HolderListing],
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let mapped = map_holder_listings(listings, market)?;
        let mut warnings = mapped.warnings;
        let examined = mapped.wallets.len();

        let report = enrich_wallets(
            &self.source,
            &self.cache,
            &mapped.wallets,
            &self.settings.enrichment,
            now,
        )
        .await;
        warnings.extend(report.warnings());

        let floors = self.settings.floors;
        let (qualified, skipped) = filter_qualified(report.profiles, &floors);
        let floor_text = format!(
            "{} position or {} profit",
            fmt_usd(floors.min_position_usd),
            fmt_usd(floors.min_profit_usd)
        );
        if skipped > 0 {
            warnings.push(format!(
                "{skipped} of {examined} wallets were below the qualification floor ({floor_text}) and were skipped"
            ));
        }

        let signal = if qualified.is_empty() {
            TradingSignal::inconclusive(format!(
                "None of the {examined} wallets examined met the qualification floor ({floor_text})."
            ))
        } else {
            let ranked = rank_wallets(qualified, &self.settings.scoring, now, self.settings.top_n);
            generate_signal(&ranked)
        };

        metrics::counter!("analyzer_analyses_total", "signal" => signal.signal.as_str()).increment(1);
        tracing::info!(
            condition_id = %market.condition_id,
            examined,
            signal = signal.signal.as_str(),
            confidence = signal.confidence,
            warnings = warnings.len(),
            "analysis complete"
        );
        Ok(AnalysisOutcome { signal, warnings })
    }
}

impl<S, C> Analyzer<S, C>
where
    S: MarketResolver + HoldersFetcher + WalletHistoryFetcher + Sync,
    C: ResponseCache,
{
    /// Resolve a market URL and analyze it, bounded by the configured timeout.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisReport, AnalysisError> {
        let timeout = self.settings.timeout;
        match tokio::time::timeout(timeout, self.run(url)).await {
            Ok(res) => res,
            Err(_elapsed) => {
                metrics::counter!("analyzer_analysis_timeouts_total").increment(1);
                tracing::warn!(url, timeout_secs = timeout.as_secs(), "analysis timed out");
                Err(AnalysisError::Timeout(timeout.as_secs()))
            }
        }
    }

    async fn run(&self, url: &str) -> Result<AnalysisReport, AnalysisError> {
        let market_ref = parse_market_url(url)?;
        let market = self.resolve_market(&market_ref).await?;
        let listings = self
            .source
            .fetch_holder_listings(&market.condition_id, self.settings.holders_limit)
            .await?;
        let outcome = self.analyze(&market, &listings).await?;
        Ok(AnalysisReport {
            market: market.summary(),
            signal: outcome.signal,
            warnings: outcome.warnings,
        })
    }

    async fn resolve_market(&self, market_ref: &MarketRef) -> Result<MarketContext, AnalysisError> {
        let key = market_ref.cache_key();
        if let Some(market) = get_json::<C, MarketContext>(&self.cache, &key).await {
            metrics::counter!("analyzer_cache_hits_total", "cache" => "market").increment(1);
            return Ok(market);
        }
        metrics::counter!("analyzer_cache_misses_total", "cache" => "market").increment(1);

        let market = self.source.resolve_market(market_ref).await?;
        set_json(&self.cache, &key, &market, self.settings.market_ttl).await;
        Ok(market)
    }
}

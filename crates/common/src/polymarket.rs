use crate::error::ApiError;
use crate::types::{
    rows_of, ActivityEvent, ApiHolderResponse, GammaEvent, GammaMarket, HistoricalPosition,
    LeaderboardEntry,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct PolymarketClient {
    data_api: Url,
    gamma_api: Url,
    client: reqwest::Client,
}

impl PolymarketClient {
    pub fn new(data_api_url: &str, gamma_api_url: &str) -> Result<Self, ApiError> {
        Self::new_with_timeout(data_api_url, gamma_api_url, Duration::from_secs(15))
    }

    pub fn new_with_timeout(
        data_api_url: &str,
        gamma_api_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self {
            data_api: parse_base(data_api_url)?,
            gamma_api: parse_base(gamma_api_url)?,
            client,
        })
    }

    pub fn data_api_url(&self) -> &str {
        self.data_api.as_str().trim_end_matches('/')
    }

    pub fn gamma_api_url(&self) -> &str {
        self.gamma_api.as_str().trim_end_matches('/')
    }

    fn build_url(base: &Url, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = base.clone();
        let joined = format!("{}{path}", base.path().trim_end_matches('/'));
        url.set_path(&joined);
        url.query_pairs_mut().extend_pairs(params.iter());
        url
    }

    pub fn events_url(&self, slug: &str) -> Url {
        Self::build_url(&self.gamma_api, "/events", &[("slug", slug)])
    }

    pub fn markets_url(&self, slug: &str) -> Url {
        Self::build_url(&self.gamma_api, "/markets", &[("slug", slug)])
    }

    pub fn holders_url(&self, condition_id: &str, limit: u32) -> Url {
        Self::build_url(
            &self.data_api,
            "/holders",
            &[("market", condition_id), ("limit", &limit.to_string())],
        )
    }

    pub fn leaderboard_url(&self, user: &str) -> Url {
        Self::build_url(
            &self.data_api,
            "/v1/leaderboard",
            &[
                ("user", user),
                ("timePeriod", "ALL"),
                ("orderBy", "PNL"),
                ("limit", "1"),
            ],
        )
    }

    pub fn positions_url(&self, user: &str, limit: u32) -> Url {
        Self::build_url(
            &self.data_api,
            "/positions",
            &[
                ("user", user),
                ("limit", &limit.to_string()),
                ("sizeThreshold", "0"),
            ],
        )
    }

    pub fn activity_url(&self, user: &str, limit: u32) -> Url {
        Self::build_url(
            &self.data_api,
            "/activity",
            &[("user", user), ("limit", &limit.to_string())],
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
        what: &str,
    ) -> Result<T, ApiError> {
        debug!(endpoint, url = %url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::from_status(endpoint, status.as_u16(), what));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }

    /// Gamma event by slug. An empty result is reported as not found.
    pub async fn fetch_event(&self, slug: &str) -> Result<GammaEvent, ApiError> {
        let events: Vec<GammaEvent> = self
            .get("gamma_events", self.events_url(slug), &format!("event {slug}"))
            .await?;
        events
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("event {slug}")))
    }

    /// Gamma market by its own slug. An empty result is reported as not found.
    pub async fn fetch_market(&self, slug: &str) -> Result<GammaMarket, ApiError> {
        let markets: Vec<GammaMarket> = self
            .get("gamma_markets", self.markets_url(slug), &format!("market {slug}"))
            .await?;
        markets
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("market {slug}")))
    }

    pub async fn fetch_holders(
        &self,
        condition_id: &str,
        limit: u32,
    ) -> Result<Vec<ApiHolderResponse>, ApiError> {
        self.get(
            "holders",
            self.holders_url(condition_id, limit),
            &format!("holders for market {condition_id}"),
        )
        .await
    }

    /// Best-effort leaderboard row for `user`. The row may belong to a different wallet;
    /// callers must check `wallet` themselves.
    pub async fn fetch_leaderboard_entry(
        &self,
        user: &str,
    ) -> Result<Option<LeaderboardEntry>, ApiError> {
        let body: Value = self
            .get("leaderboard", self.leaderboard_url(user), user)
            .await?;
        Ok(LeaderboardEntry::first_from_response(&body))
    }

    pub async fn fetch_positions(
        &self,
        user: &str,
        limit: u32,
    ) -> Result<Vec<HistoricalPosition>, ApiError> {
        let body: Value = self
            .get("positions", self.positions_url(user, limit), user)
            .await?;
        Ok(rows_of(&body)
            .iter()
            .filter_map(HistoricalPosition::from_value)
            .take(limit as usize)
            .collect())
    }

    pub async fn fetch_activity(
        &self,
        user: &str,
        limit: u32,
    ) -> Result<Vec<ActivityEvent>, ApiError> {
        let body: Value = self
            .get("activity", self.activity_url(user, limit), user)
            .await?;
        Ok(rows_of(&body)
            .iter()
            .filter_map(ActivityEvent::from_value)
            .take(limit as usize)
            .collect())
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

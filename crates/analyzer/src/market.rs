use common::types::{GammaEvent, GammaMarket};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AnalysisError;
use crate::types::Position;

/// Resolved market: outcome labels, prices and token ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub event_slug: Option<String>,
    pub market_slug: Option<String>,
    pub question: String,
    pub condition_id: String,
    /// Index 0 is the YES side.
    pub outcomes: Vec<String>,
    /// Outcome label -> price in [0, 1]. Missing or out-of-range prices are absent.
    pub prices: HashMap<String, f64>,
    /// Token id -> outcome label.
    pub token_outcomes: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeQuote {
    pub outcome: String,
    pub price: Option<f64>,
}

/// Market description returned alongside the signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub question: String,
    pub event_slug: Option<String>,
    pub market_slug: Option<String>,
    pub condition_id: String,
    pub outcomes: Vec<OutcomeQuote>,
}

impl MarketContext {
    /// Build from a Gamma event, picking the market whose slug matches `market_slug`
    /// and falling back to the event's first market.
    pub fn from_gamma(event: &GammaEvent, market_slug: Option<&str>) -> Result<Self, AnalysisError> {
        let market = market_slug
            .and_then(|wanted| {
                event
                    .markets
                    .iter()
                    .find(|m| m.slug.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(wanted)))
            })
            .or_else(|| event.markets.first())
            .ok_or_else(|| {
                AnalysisError::InvalidMarketData(format!(
                    "event {} has no markets",
                    event.slug.as_deref().unwrap_or("<unknown>")
                ))
            })?;
        Self::from_gamma_market(event.slug.as_deref(), event.title.as_deref(), market)
    }

    /// Build from a market fetched by its own slug; the parent event comes from its links.
    pub fn from_standalone(market: &GammaMarket) -> Result<Self, AnalysisError> {
        let parent = market.events.first();
        Self::from_gamma_market(
            parent.and_then(|e| e.slug.as_deref()),
            parent.and_then(|e| e.title.as_deref()),
            market,
        )
    }

    fn from_gamma_market(
        event_slug: Option<&str>,
        event_title: Option<&str>,
        market: &GammaMarket,
    ) -> Result<Self, AnalysisError> {
        let condition_id = market
            .condition_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AnalysisError::InvalidMarketData("market has no condition id".into()))?
            .to_string();
        if market.outcomes.is_empty() {
            return Err(AnalysisError::InvalidMarketData(format!(
                "market {condition_id} lists no outcomes"
            )));
        }

        let prices = market
            .outcomes
            .iter()
            .zip(market.outcome_prices.iter())
            .filter_map(|(outcome, raw)| {
                let p: f64 = raw.trim().parse().ok()?;
                (p.is_finite() && (0.0..=1.0).contains(&p)).then(|| (outcome.clone(), p))
            })
            .collect();

        let token_outcomes = market
            .clob_token_ids
            .iter()
            .zip(market.outcomes.iter())
            .map(|(token, outcome)| (token.clone(), outcome.clone()))
            .collect();

        Ok(Self {
            event_slug: event_slug.map(str::to_string),
            market_slug: market.slug.clone(),
            question: market
                .question
                .clone()
                .or_else(|| event_title.map(str::to_string))
                .unwrap_or_default(),
            condition_id,
            outcomes: market.outcomes.clone(),
            prices,
            token_outcomes,
        })
    }

    pub fn outcome_for_token(&self, token_id: &str) -> Option<&str> {
        self.token_outcomes.get(token_id).map(String::as_str)
    }

    pub fn position_of(&self, outcome: &str) -> Position {
        match self.outcomes.first() {
            Some(first) if first.eq_ignore_ascii_case(outcome) => Position::Yes,
            _ => Position::No,
        }
    }

    pub fn price_of(&self, outcome: &str) -> Option<f64> {
        self.prices.get(outcome).copied()
    }

    pub fn summary(&self) -> MarketSummary {
        MarketSummary {
            question: self.question.clone(),
            event_slug: self.event_slug.clone(),
            market_slug: self.market_slug.clone(),
            condition_id: self.condition_id.clone(),
            outcomes: self
                .outcomes
                .iter()
                .map(|o| OutcomeQuote {
                    outcome: o.clone(),
                    price: self.price_of(o),
                })
                .collect(),
        }
    }
}

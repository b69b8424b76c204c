use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::fields::{self, FieldExtractor};

/// Event from Gamma API /events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GammaEvent {
    pub slug: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

/// Market nested inside a Gamma event.
///
/// `outcomes`, `outcomePrices` and `clobTokenIds` arrive as JSON-encoded strings
/// (`"[\"Yes\",\"No\"]"`) on most revisions and as plain arrays on some.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GammaMarket {
    pub slug: Option<String>,
    pub question: Option<String>,
    #[serde(rename = "conditionId")]
    pub condition_id: Option<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub outcomes: Vec<String>,
    #[serde(rename = "outcomePrices", default, deserialize_with = "de_string_list")]
    pub outcome_prices: Vec<String>,
    #[serde(rename = "clobTokenIds", default, deserialize_with = "de_string_list")]
    pub clob_token_ids: Vec<String>,
    /// Parent events; only populated by the `/markets` endpoint.
    #[serde(default)]
    pub events: Vec<GammaEventLink>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GammaEventLink {
    pub slug: Option<String>,
    pub title: Option<String>,
}

/// Holder from Data API /holders.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiHolder {
    #[serde(rename = "proxyWallet")]
    pub proxy_wallet: Option<String>,
    pub amount: Option<f64>,
    pub asset: Option<String>,
    pub pseudonym: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "outcomeIndex")]
    pub outcome_index: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiHolderResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub holders: Vec<ApiHolder>,
}

const LEADERBOARD_WALLET: FieldExtractor<String> =
    FieldExtractor::new(&["proxyWallet", "proxy_wallet", "address", "user"], fields::text);
const LEADERBOARD_NAME: FieldExtractor<String> =
    FieldExtractor::new(&["userName", "name", "pseudonym"], fields::text);
const LEADERBOARD_PNL: FieldExtractor<f64> =
    FieldExtractor::new(&["pnl", "profit", "amount"], fields::number);
const LEADERBOARD_MARKETS: FieldExtractor<u32> = FieldExtractor::new(
    &["marketsTraded", "markets_traded", "numMarkets", "markets"],
    fields::count,
);

const POSITION_PNL: FieldExtractor<f64> =
    FieldExtractor::new(&["realizedPnl", "cashPnl", "pnl"], fields::number);
const POSITION_INITIAL_VALUE: FieldExtractor<f64> =
    FieldExtractor::new(&["initialValue", "initial_value"], fields::number);
const POSITION_CURRENT_VALUE: FieldExtractor<f64> =
    FieldExtractor::new(&["currentValue", "current_value", "value"], fields::number);

const ACTIVITY_TIMESTAMP: FieldExtractor<DateTime<Utc>> =
    FieldExtractor::new(&["timestamp", "createdAt", "time"], fields::timestamp);

/// Normalized leaderboard row for one wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub wallet: Option<String>,
    pub name: Option<String>,
    pub pnl: Option<f64>,
    pub markets_traded: Option<u32>,
}

impl LeaderboardEntry {
    pub fn from_value(obj: &Value) -> Option<Self> {
        if !obj.is_object() {
            return None;
        }
        Some(Self {
            wallet: LEADERBOARD_WALLET.extract(obj),
            name: LEADERBOARD_NAME.extract(obj),
            pnl: LEADERBOARD_PNL.extract(obj),
            markets_traded: LEADERBOARD_MARKETS.extract(obj),
        })
    }

    /// Adapter for the leaderboard response shapes: a bare array, an object wrapping the
    /// array (`data` / `leaderboard` / `results`), or a single row object.
    pub fn first_from_response(body: &Value) -> Option<Self> {
        match body {
            Value::Array(rows) => rows.first().and_then(Self::from_value),
            Value::Object(map) => ["data", "leaderboard", "results"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
                .map_or_else(
                    || Self::from_value(body),
                    |rows| rows.first().and_then(Self::from_value),
                ),
            _ => None,
        }
    }
}

/// Normalized historical position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPosition {
    pub realized_pnl: Option<f64>,
    pub initial_value: Option<f64>,
    pub current_value: Option<f64>,
}

impl HistoricalPosition {
    pub fn from_value(obj: &Value) -> Option<Self> {
        if !obj.is_object() {
            return None;
        }
        Some(Self {
            realized_pnl: POSITION_PNL.extract(obj),
            initial_value: POSITION_INITIAL_VALUE.extract(obj),
            current_value: POSITION_CURRENT_VALUE.extract(obj),
        })
    }

    /// Initial value if reported, else current value.
    pub fn size(&self) -> Option<f64> {
        self.initial_value.or(self.current_value)
    }
}

/// Normalized activity event; only the time is consumed downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityEvent {
    pub fn from_value(obj: &Value) -> Option<Self> {
        if !obj.is_object() {
            return None;
        }
        Some(Self {
            timestamp: ACTIVITY_TIMESTAMP.extract(obj),
        })
    }
}

/// Rows of a list endpoint, tolerating a wrapping object.
pub fn rows_of(body: &Value) -> &[Value] {
    match body {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => ["data", "results"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

/// Deserialize either a JSON array or a string holding a JSON array into strings.
/// Numbers inside the array are kept in their textual form.
fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let list = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => {
            serde_json::from_str::<Vec<Value>>(&s).map_err(serde::de::Error::custom)?
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected array or JSON-encoded array, got {other}"
            )))
        }
    };
    Ok(list
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

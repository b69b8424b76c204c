use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use common::cache::ResponseCache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::AnalysisError;
use crate::pipeline::{AnalysisReport, Analyzer};
use crate::sources::{HoldersFetcher, MarketResolver, WalletHistoryFetcher};

/// Shared application state available to all handlers.
pub struct AppState<S, C> {
    pub analyzer: Analyzer<S, C>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: MarketResolver + HoldersFetcher + WalletHistoryFetcher + Send + Sync + 'static,
    C: ResponseCache + 'static,
{
    Router::new()
        .route("/api/health", get(health::<S, C>))
        .route("/api/analyze", post(analyze::<S, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health<S, C>(State(state): State<Arc<AppState<S, C>>>) -> impl IntoResponse {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
    })
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

async fn analyze<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AnalysisError>
where
    S: MarketResolver + HoldersFetcher + WalletHistoryFetcher + Send + Sync + 'static,
    C: ResponseCache + 'static,
{
    if req.url.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("url is required".into()));
    }
    tracing::info!(url = %req.url, "analyze request");
    state.analyzer.analyze_url(&req.url).await.map(Json)
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) | Self::InvalidMarketData(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) | Self::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "analysis failed");
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "analysis rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.kind(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AnalysisSettings;
    use crate::testing::{smart_money_source, FakeSource};
    use axum::body::Body;
    use axum::http::Request;
    use common::cache::NoCache;
    use tower::ServiceExt;

    fn test_app(source: FakeSource) -> Router {
        let state = Arc::new(AppState {
            analyzer: Analyzer::new(source, NoCache, AnalysisSettings::default()),
            started_at: chrono::Utc::now(),
        });
        router(state)
    }

    fn analyze_request(url: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "url": url }).to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app(FakeSource::default());
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_analyze_returns_signal_and_market() {
        let app = test_app(smart_money_source());
        let response = app
            .oneshot(analyze_request("https://polymarket.com/event/will-it-rain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["signal"]["signal"], "BUY_YES");
        assert_eq!(json["market"]["condition_id"], "0xcond");
        assert_eq!(json["signal"]["data"]["top_wallets"][0]["position"], "YES");
        assert!(json["warnings"].is_array());
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_url() {
        let app = test_app(smart_money_source());
        let response = app
            .oneshot(analyze_request("https://example.com/whatever"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_url() {
        let app = test_app(smart_money_source());
        let response = app.oneshot(analyze_request("  ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_unknown_market_is_404() {
        let app = test_app(FakeSource::default());
        let response = app
            .oneshot(analyze_request("https://polymarket.com/event/nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_analyze_rate_limited_is_429() {
        let app = test_app(FakeSource {
            holders_status: Some(429),
            ..smart_money_source()
        });
        let response = app
            .oneshot(analyze_request("https://polymarket.com/event/will-it-rain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(response).await;
        assert!(json["message"].as_str().unwrap().contains("retry later"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let app = test_app(FakeSource {
            holders_status: Some(503),
            ..smart_money_source()
        });
        let response = app
            .oneshot(analyze_request("https://polymarket.com/event/will-it-rain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

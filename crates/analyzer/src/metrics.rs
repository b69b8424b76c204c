use anyhow::Result;
use axum::{extract::State, routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

pub fn describe() {
    describe_counter!(
        "analyzer_analyses_total",
        "Completed analyses, labelled by signal."
    );
    describe_counter!(
        "analyzer_analysis_timeouts_total",
        "Analyses aborted by the request timeout."
    );
    describe_counter!(
        "analyzer_wallets_enriched_total",
        "Wallets enriched with trading history."
    );
    describe_counter!(
        "analyzer_blank_profiles_total",
        "Enriched wallets with zero markets and zero profit."
    );
    describe_counter!(
        "analyzer_cache_hits_total",
        "Response cache hits, labelled by cache."
    );
    describe_counter!(
        "analyzer_cache_misses_total",
        "Response cache misses, labelled by cache."
    );
    describe_counter!(
        "analyzer_api_requests_total",
        "Number of upstream API requests made."
    );
    describe_counter!(
        "analyzer_api_errors_total",
        "Failed upstream API requests, labelled by error kind."
    );
    describe_histogram!(
        "analyzer_api_latency_ms",
        "Upstream API request latency in milliseconds."
    );
    describe_counter!(
        common::observability::ERROR_EVENTS_METRIC,
        "Tracing events emitted at ERROR level."
    );
}

/// Install the global recorder. Rendering happens in [`serve_prometheus`].
pub fn install_prometheus() -> Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(handle)
}

/// Recorder upkeep runs on each scrape.
async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.run_upkeep();
    handle.render()
}

/// Bind the scrape listener on `port` and serve it in the background.
pub async fn serve_prometheus(port: u16, handle: PrometheusHandle) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, metrics_router(handle)).await {
            tracing::error!(error = %e, "prometheus listener stopped");
        }
    });
    Ok(addr)
}

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod cli;
mod error;
mod market;
mod metrics;
mod pipeline;
mod position_mapper;
mod profile_enricher;
mod qualification;
mod signal;
mod sources;
#[cfg(test)]
mod testing;
mod types;
mod wallet_scoring;

#[tokio::main]
async fn main() -> Result<()> {
    let config = common::config::Config::load()?;

    let (dispatch, _otel_guard) =
        common::observability::build_dispatch("analyzer", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    let cmd = cli::parse_args(std::env::args()).map_err(anyhow::Error::msg)?;

    let client = common::polymarket::PolymarketClient::new_with_timeout(
        &config.polymarket.data_api_url,
        &config.polymarket.gamma_api_url,
        Duration::from_secs(config.polymarket.request_timeout_secs),
    )?;
    let cache = common::cache::MemoryCache::new(config.cache.max_entries);
    let analyzer = pipeline::Analyzer::new(
        client,
        cache,
        pipeline::AnalysisSettings::from(&config),
    );

    if let cli::Command::Analyze { url } = cmd {
        println!("{}", cli::run_analyze(&analyzer, &url).await?);
        return Ok(());
    }

    if let Some(obs) = &config.observability {
        let handle = metrics::install_prometheus()?;
        metrics::describe();
        let addr = metrics::serve_prometheus(obs.prometheus_port, handle).await?;
        tracing::info!(addr = %addr, "prometheus exporter listening");
    }

    let settings = analyzer.settings();
    tracing::info!(
        top_n = settings.top_n,
        batch_size = settings.enrichment.batch_size,
        timeout_secs = settings.timeout.as_secs(),
        "smart money analyzer starting"
    );

    let state = Arc::new(api::AppState {
        analyzer,
        started_at: chrono::Utc::now(),
    });
    let app = api::router(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting analyzer HTTP server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

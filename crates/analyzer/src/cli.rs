use anyhow::Result;
use common::cache::ResponseCache;

use crate::pipeline::Analyzer;
use crate::sources::{HoldersFetcher, MarketResolver, WalletHistoryFetcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    Analyze { url: String },
}

pub fn parse_args<I>(mut args: I) -> std::result::Result<Command, String>
where
    I: Iterator<Item = String>,
{
    // Drop argv[0].
    let _ = args.next();

    let Some(cmd) = args.next() else {
        return Ok(Command::Serve);
    };

    match cmd.as_str() {
        "serve" => Ok(Command::Serve),
        "analyze" => {
            let url = args
                .next()
                .ok_or_else(|| "usage: analyzer analyze <market-url>".to_string())?;
            Ok(Command::Analyze { url })
        }
        other => Err(format!("unknown command: {other}")),
    }
}

/// One-shot analysis printed to stdout as JSON.
pub async fn run_analyze<S, C>(analyzer: &Analyzer<S, C>, url: &str) -> Result<String>
where
    S: MarketResolver + HoldersFetcher + WalletHistoryFetcher + Sync,
    C: ResponseCache,
{
    let report = analyzer.analyze_url(url).await?;
    Ok(serde_json::to_string_pretty(&report)?)
}

use reqwest::Url;
use thiserror::Error;

/// Slugs identifying a market on polymarket.com.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketRef {
    /// `/event/<event>[/<market>]`; `market_slug` picks one market of a multi-market event.
    Event {
        event_slug: String,
        market_slug: Option<String>,
    },
    /// `/market/<slug>`, addressed by the market's own slug.
    Market { slug: String },
}

impl MarketRef {
    pub fn cache_key(&self) -> String {
        match self {
            Self::Event {
                event_slug,
                market_slug: Some(m),
            } => format!("market:{event_slug}/{m}"),
            Self::Event {
                event_slug,
                market_slug: None,
            } => format!("market:{event_slug}"),
            // Slugs never start with '/', so this cannot collide with an event key.
            Self::Market { slug } => format!("market:/{slug}"),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Event { event_slug, .. } => event_slug,
            Self::Market { slug } => slug,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketUrlError {
    #[error("not a valid URL: {0}")]
    Unparseable(String),
    #[error("unsupported host {0}; expected polymarket.com")]
    UnsupportedHost(String),
    #[error("URL does not point at a Polymarket event or market: {0}")]
    UnsupportedPath(String),
}

/// Parse `https://polymarket.com/event/<event>[/<market>]` or `.../market/<slug>`.
/// Query strings, fragments and a leading `www.` are ignored.
pub fn parse_market_url(input: &str) -> Result<MarketRef, MarketUrlError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed)
        .map_err(|_parse_err| MarketUrlError::Unparseable(trimmed.to_string()))?;

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if host != "polymarket.com" && host != "www.polymarket.com" {
        return Err(MarketUrlError::UnsupportedHost(host));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    // Locale-prefixed paths (`/es/event/...`) carry a two-letter first segment.
    let segments = match segments.as_slice() {
        [locale, rest @ ..] if locale.len() == 2 && !rest.is_empty() => rest,
        all => all,
    };

    match segments {
        ["event", event] => Ok(MarketRef::Event {
            event_slug: (*event).to_string(),
            market_slug: None,
        }),
        ["event", event, market, ..] => Ok(MarketRef::Event {
            event_slug: (*event).to_string(),
            market_slug: Some((*market).to_string()),
        }),
        ["market", slug, ..] => Ok(MarketRef::Market {
            slug: (*slug).to_string(),
        }),
        _ => Err(MarketUrlError::UnsupportedPath(trimmed.to_string())),
    }
}

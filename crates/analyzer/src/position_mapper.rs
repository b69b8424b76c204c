use std::collections::HashSet;

use crate::error::AnalysisError;
use crate::market::MarketContext;
use crate::types::{HolderListing, PartialWallet, Position};

/// Price assumed when the market does not quote the resolved outcome.
pub const FALLBACK_PRICE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct MappedHolders {
    pub wallets: Vec<PartialWallet>,
    pub warnings: Vec<String>,
}

/// Resolve every holder to a side and a dollar size.
///
/// Listings whose token is unknown to the market fall back to listing order: the first
/// listing is YES and every later one is NO. A wallet appearing in several listings keeps
/// its first occurrence.
pub fn map_holder_listings(
    listings: &[HolderListing],
    market: &MarketContext,
) -> Result<MappedHolders, AnalysisError> {
    if listings.is_empty() {
        return Err(AnalysisError::InvalidMarketData(format!(
            "no holder listings for market {}",
            market.condition_id
        )));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut wallets = Vec::new();
    let mut warnings = Vec::new();

    for (idx, listing) in listings.iter().enumerate() {
        let (position, outcome) = match market.outcome_for_token(&listing.token_id) {
            Some(outcome) => (market.position_of(outcome), Some(outcome.to_string())),
            None => {
                let (position, slot) = if idx == 0 { (Position::Yes, 0) } else { (Position::No, 1) };
                warnings.push(format!(
                    "token {} is not listed for this market; assumed {position} by listing order",
                    listing.token_id
                ));
                (position, market.outcomes.get(slot).cloned())
            }
        };
        let price = outcome
            .as_deref()
            .and_then(|o| market.price_of(o))
            .unwrap_or(FALLBACK_PRICE);

        for holder in &listing.holders {
            let address = holder.address.to_ascii_lowercase();
            if !seen.insert(address.clone()) {
                continue;
            }
            wallets.push(PartialWallet {
                address,
                name: holder.name.clone(),
                position,
                position_size: holder.shares * price,
                share_count: holder.shares,
            });
        }
    }

    Ok(MappedHolders { wallets, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Holder;
    use std::collections::HashMap;

    fn market() -> MarketContext {
        MarketContext {
            event_slug: Some("e".into()),
            market_slug: Some("m".into()),
            question: "Q?".into(),
            condition_id: "0xcond".into(),
            outcomes: vec!["Yes".into(), "No".into()],
            prices: HashMap::from([("Yes".to_string(), 0.6), ("No".to_string(), 0.4)]),
            token_outcomes: HashMap::from([
                ("111".to_string(), "Yes".to_string()),
                ("222".to_string(), "No".to_string()),
            ]),
        }
    }

    fn holder(addr: &str, shares: f64) -> Holder {
        Holder {
            address: addr.to_string(),
            shares,
            name: None,
        }
    }

    fn listing(token: &str, holders: Vec<Holder>) -> HolderListing {
        HolderListing {
            token_id: token.to_string(),
            holders,
        }
    }

    #[test]
    fn test_maps_by_token_and_prices_positions() {
        let out = map_holder_listings(
            &[
                listing("222", vec![holder("0xNo", 100.0)]),
                listing("111", vec![holder("0xYes", 1000.0)]),
            ],
            &market(),
        )
        .unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.wallets[0].position, Position::No);
        assert!((out.wallets[0].position_size - 40.0).abs() < 1e-9);
        assert_eq!(out.wallets[1].position, Position::Yes);
        assert!((out.wallets[1].position_size - 600.0).abs() < 1e-9);
        assert_eq!(out.wallets[1].address, "0xyes");
    }

    #[test]
    fn test_positional_fallback_warns_per_listing() {
        let out = map_holder_listings(
            &[
                listing("x1", vec![holder("0xa", 10.0)]),
                listing("x2", vec![holder("0xb", 10.0)]),
            ],
            &market(),
        )
        .unwrap();
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.wallets[0].position, Position::Yes);
        assert_eq!(out.wallets[1].position, Position::No);
        assert!((out.wallets[1].position_size - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_price_defaults_to_half() {
        let mut m = market();
        m.prices.clear();
        let out = map_holder_listings(&[listing("111", vec![holder("0xa", 10.0)])], &m).unwrap();
        assert!((out.wallets[0].position_size - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_dedup_is_case_insensitive_first_seen() {
        let out = map_holder_listings(
            &[
                listing("111", vec![holder("0xABC", 10.0)]),
                listing("222", vec![holder("0xabc", 99.0), holder("0xdef", 1.0)]),
            ],
            &market(),
        )
        .unwrap();
        assert_eq!(out.wallets.len(), 2);
        assert_eq!(out.wallets[0].address, "0xabc");
        assert_eq!(out.wallets[0].position, Position::Yes);
        assert_eq!(out.wallets[0].share_count, 10.0);
    }

    #[test]
    fn test_no_listings_is_invalid_market_data() {
        assert!(matches!(
            map_holder_listings(&[], &market()),
            Err(AnalysisError::InvalidMarketData(_))
        ));
    }
}

use common::market_url::parse_market_url;
use common::polymarket::PolymarketClient;

fn live_client() -> PolymarketClient {
    PolymarketClient::new(
        "https://data-api.polymarket.com",
        "https://gamma-api.polymarket.com",
    )
    .unwrap()
}

#[tokio::test]
#[ignore] // requires network
async fn test_fetch_real_event_and_holders() {
    let client = live_client();
    let market_ref =
        parse_market_url("https://polymarket.com/event/presidential-election-winner-2028").unwrap();
    let event = client.fetch_event(market_ref.slug()).await.unwrap();
    let market = event.markets.first().expect("event has markets");
    assert_eq!(market.outcomes.len(), market.outcome_prices.len());

    let condition_id = market.condition_id.clone().unwrap();
    let holders = client.fetch_holders(&condition_id, 20).await.unwrap();
    assert!(holders.iter().all(|h| h.holders.len() <= 20));
}

#[tokio::test]
#[ignore] // requires network
async fn test_fetch_real_wallet_history_parses() {
    let client = live_client();
    let wallet = "0x56687bf447db6ffa42ffe2204a05edaa20f55839";
    let positions = client.fetch_positions(wallet, 50).await.unwrap();
    assert!(positions.len() <= 50);
    let activity = client.fetch_activity(wallet, 5).await.unwrap();
    assert!(activity.len() <= 5);
    // Leaderboard may legitimately return nothing or someone else.
    let _ = client.fetch_leaderboard_entry(wallet).await.unwrap();
}

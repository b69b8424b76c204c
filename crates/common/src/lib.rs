pub mod cache;
pub mod config;
pub mod error;
pub mod fields;
pub mod market_url;
pub mod observability;
pub mod polymarket;
pub mod types;

//! Price feed types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One coin's market data from a single upstream response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    /// CoinGecko coin id (e.g., "bitcoin")
    pub coin_id: String,
    /// Spot price in USD
    pub price_usd: f64,
    /// 24h change in percent; 0 when upstream omits it
    pub change_24h_pct: f64,
    /// 24h traded volume in USD
    pub volume_24h: Option<f64>,
    /// Market capitalisation in USD
    pub market_cap: Option<f64>,
    /// Price in each additional quote currency
    pub quotes: BTreeMap<String, f64>,
}

/// Price feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// The upstream API failed, timed out or returned nothing usable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

//! Price feed module
//!
//! Polls spot prices for a set of coins from the CoinGecko REST API

mod coingecko;
mod types;

pub use coingecko::{CoinGeckoClient, COINGECKO_API_URL};
pub use types::{CoinQuote, FeedError};

use async_trait::async_trait;

/// Trait for upstream price sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch current quotes for `coins` in one request.
    ///
    /// Coins the upstream does not know are left out of the result.
    async fn fetch_quotes(
        &self,
        coins: &[String],
        currencies: &[String],
    ) -> Result<Vec<CoinQuote>, FeedError>;
}

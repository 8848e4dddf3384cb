//! CoinGecko `simple/price` client

use super::{CoinQuote, FeedError, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// CoinGecko public API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Client for CoinGecko's simple price endpoint
pub struct CoinGeckoClient {
    base_url: String,
    client: Client,
}

impl CoinGeckoClient {
    /// Create a client against the public API
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        Self::with_base_url(COINGECKO_API_URL, timeout)
    }

    /// Create a client against a custom base URL (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coin-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FeedError::ClientBuild)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a `simple/price` body into quotes, in `coins` order.
    ///
    /// Coins absent from the body, or without a numeric `usd` price, are
    /// skipped. Missing optional fields stay `None`; a missing 24h change
    /// reads as zero.
    pub(crate) fn parse_simple_price(
        body: &Value,
        coins: &[String],
        currencies: &[String],
    ) -> Vec<CoinQuote> {
        let Some(by_coin) = body.as_object() else {
            return Vec::new();
        };

        coins
            .iter()
            .filter_map(|coin| {
                let fields = by_coin.get(coin)?.as_object()?;
                let quote = Self::parse_coin(coin, fields, currencies);
                if quote.is_none() {
                    tracing::debug!(coin = %coin, "No usd price in upstream response");
                }
                quote
            })
            .collect()
    }

    fn parse_coin(coin: &str, fields: &Map<String, Value>, currencies: &[String]) -> Option<CoinQuote> {
        let number = |key: &str| fields.get(key).and_then(Value::as_f64);

        let price_usd = number("usd")?;
        let quotes = currencies
            .iter()
            .filter(|c| c.as_str() != "usd")
            .filter_map(|c| number(c).map(|p| (c.clone(), p)))
            .collect::<BTreeMap<_, _>>();

        Some(CoinQuote {
            coin_id: coin.to_string(),
            price_usd,
            change_24h_pct: number("usd_24h_change").unwrap_or(0.0),
            volume_24h: number("usd_24h_vol"),
            market_cap: number("usd_market_cap"),
            quotes,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_quotes(
        &self,
        coins: &[String],
        currencies: &[String],
    ) -> Result<Vec<CoinQuote>, FeedError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = coins.join(",");
        let vs = currencies.join(",");

        tracing::debug!(url = %url, coins = coins.len(), "Fetching prices from CoinGecko");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", vs.as_str()),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
                ("include_market_cap", "true"),
            ])
            .send()
            .await
            .map_err(|e| FeedError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::UpstreamUnavailable(format!(
                "CoinGecko API error: {} - {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FeedError::UpstreamUnavailable(format!("invalid body: {}", e)))?;

        let quotes = Self::parse_simple_price(&body, coins, currencies);
        if quotes.is_empty() {
            return Err(FeedError::UpstreamUnavailable(
                "response contained no prices".to_string(),
            ));
        }

        Ok(quotes)
    }
}

//! Snapshot and history types shared by the poller, the server and dashboards

use crate::alerts::Alert;
use crate::feed::CoinQuote;
use crate::indicators::IndicatorSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Latest snapshot per coin id
pub type LatestSnapshotMap = BTreeMap<String, CoinSnapshot>;

/// Price history per coin id, oldest point first
pub type HistoryMap = BTreeMap<String, Vec<HistoryPoint>>;

/// A coin's price, indicators and alerts at one poll cycle.
///
/// Deserialization is lenient: wrong-typed or missing fields fall back to
/// defaults instead of failing, so a dashboard can always render something.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSnapshot {
    #[serde(rename = "id", deserialize_with = "lenient_string")]
    pub coin_id: String,
    #[serde(rename = "usd", deserialize_with = "lenient_f64")]
    pub price_usd: f64,
    #[serde(rename = "usd_24h_change", deserialize_with = "lenient_f64")]
    pub change_24h_pct: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub rsi: Option<f64>,
    #[serde(rename = "ma_7", deserialize_with = "lenient_opt_f64")]
    pub ma_short: Option<f64>,
    #[serde(rename = "ma_30", deserialize_with = "lenient_opt_f64")]
    pub ma_long: Option<f64>,
    #[serde(deserialize_with = "lenient_alerts")]
    pub alerts: Vec<Alert>,
    #[serde(rename = "usd_24h_vol", deserialize_with = "lenient_opt_f64")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "usd_market_cap", deserialize_with = "lenient_opt_f64")]
    pub market_cap: Option<f64>,
    /// Price in other quote currencies, one top-level key each (`"eur": 41000.0`)
    #[serde(flatten, deserialize_with = "lenient_quotes")]
    pub quotes: BTreeMap<String, f64>,
}

impl CoinSnapshot {
    /// Build a snapshot from an upstream quote plus derived values
    pub fn from_quote(quote: CoinQuote, indicators: IndicatorSet, alerts: Vec<Alert>) -> Self {
        Self {
            coin_id: quote.coin_id,
            price_usd: quote.price_usd,
            change_24h_pct: quote.change_24h_pct,
            rsi: indicators.rsi,
            ma_short: indicators.ma_short,
            ma_long: indicators.ma_long,
            alerts,
            volume_24h: quote.volume_24h,
            market_cap: quote.market_cap,
            quotes: quote.quotes,
        }
    }
}

/// One raw price observation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPoint {
    /// Seconds since the Unix epoch
    #[serde(deserialize_with = "lenient_f64")]
    pub timestamp: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
}

/// Payload of a `price_update` push event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub latest_data: LatestSnapshotMap,
    pub price_history: HistoryMap,
}

impl PriceUpdate {
    /// Decode a push payload, tolerating malformed parts
    pub fn from_value(value: &Value) -> Self {
        Self {
            latest_data: decode_latest(value.get("latest_data").unwrap_or(&Value::Null)),
            price_history: decode_history(value.get("price_history").unwrap_or(&Value::Null)),
        }
    }
}

/// Decode a latest-snapshot map; non-object entries become empty snapshots
pub fn decode_latest(value: &Value) -> LatestSnapshotMap {
    let Some(by_coin) = value.as_object() else {
        return LatestSnapshotMap::new();
    };

    by_coin
        .iter()
        .map(|(coin, raw)| {
            let mut snapshot: CoinSnapshot = serde_json::from_value(raw.clone()).unwrap_or_default();
            if snapshot.coin_id.is_empty() {
                snapshot.coin_id = coin.clone();
            }
            (coin.clone(), snapshot)
        })
        .collect()
}

/// Decode a history map; malformed series become empty, malformed points are dropped
pub fn decode_history(value: &Value) -> HistoryMap {
    let Some(by_coin) = value.as_object() else {
        return HistoryMap::new();
    };

    by_coin
        .iter()
        .map(|(coin, raw)| {
            let points = raw
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter(|item| item.is_object())
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            (coin.clone(), points)
        })
        .collect()
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_alerts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Alert>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Leftover keys of a snapshot entry; only numeric ones are quotes
fn lenient_quotes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    Ok(BTreeMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .filter_map(|(k, v)| v.as_f64().map(|p| (k, p)))
        .collect())
}

//! Configuration types for coin-dashboard

use crate::alerts::AlertThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding `server.secret_key`
pub const SECRET_KEY_ENV: &str = "DASHBOARD_SECRET_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP / WebSocket server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Session signing secret. Only carried through; nothing is authenticated.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Coin charted when a dashboard first loads
    #[serde(default = "default_coin")]
    pub default_coin: String,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_secret_key() -> String {
    "your-secret-key-here".to_string()
}
fn default_coin() -> String {
    "bitcoin".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            secret_key: default_secret_key(),
            default_coin: default_coin(),
        }
    }
}

/// Upstream price polling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    /// CoinGecko API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between poll cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum history points kept per coin
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// CoinGecko coin ids to track
    #[serde(default = "default_coins")]
    pub coins: Vec<String>,

    /// Quote currencies. `usd` is always requested.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
}

fn default_base_url() -> String {
    crate::feed::COINGECKO_API_URL.to_string()
}
fn default_interval_secs() -> u64 {
    60
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_history_limit() -> usize {
    100
}
fn default_coins() -> Vec<String> {
    [
        "bitcoin",
        "ethereum",
        "binancecoin",
        "ripple",
        "cardano",
        "solana",
        "polkadot",
        "dogecoin",
        "avalanche-2",
        "polygon",
        "chainlink",
        "uniswap",
        "aave",
        "stellar",
        "cosmos",
        "monero",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_currencies() -> Vec<String> {
    vec!["usd".to_string(), "eur".to_string(), "gbp".to_string()]
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            history_limit: default_history_limit(),
            coins: default_coins(),
            currencies: default_currencies(),
        }
    }
}

/// Indicator window sizes (in history points)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_ma_short")]
    pub ma_short: usize,
    #[serde(default = "default_ma_long")]
    pub ma_long: usize,
}

fn default_rsi_period() -> usize {
    14
}
fn default_ma_short() -> usize {
    7
}
fn default_ma_long() -> usize {
    30
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            ma_short: default_ma_short(),
            ma_long: default_ma_long(),
        }
    }
}

/// Per-coin alert thresholds, keyed by coin id
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct AlertsConfig(pub BTreeMap<String, AlertThresholds>);

impl AlertsConfig {
    /// Thresholds configured for a coin, if any
    pub fn get(&self, coin: &str) -> Option<&AlertThresholds> {
        self.0.get(coin)
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        let mut alerts = BTreeMap::new();
        alerts.insert(
            "bitcoin".to_string(),
            AlertThresholds {
                high: Some(85_000.0),
                low: Some(80_000.0),
            },
        );
        alerts.insert(
            "ethereum".to_string(),
            AlertThresholds {
                high: Some(2_000.0),
                low: Some(1_800.0),
            },
        );
        Self(alerts)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PORT` and `DASHBOARD_SECRET_KEY` overrides from `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(secret) = lookup(SECRET_KEY_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            self.server.secret_key = secret;
        }
    }

    /// Coin ids to poll, trimmed and deduplicated in configured order
    pub fn tracked_coins(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for coin in &self.poller.coins {
            let coin = coin.trim().to_lowercase();
            if !coin.is_empty() && !out.contains(&coin) {
                out.push(coin);
            }
        }
        out
    }

    /// Currencies to request upstream, `usd` first and deduplicated
    pub fn quote_currencies(&self) -> Vec<String> {
        let mut out = vec!["usd".to_string()];
        for c in &self.poller.currencies {
            let c = c.trim().to_lowercase();
            if !c.is_empty() && !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }
}

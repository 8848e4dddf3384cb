//! Where a dashboard gets its data: one-shot reads and a push subscription

use crate::market::{decode_history, decode_latest, HistoryMap, LatestSnapshotMap, PriceUpdate};
use crate::server::{PushEvent, PRICE_UPDATE_EVENT};
use crate::ws::{WsClient, WsConfig, WsMessage};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

/// One-shot reads of the server's current state
#[async_trait]
pub trait SnapshotApi: Send + Sync {
    /// Latest snapshot per coin
    async fn fetch_latest(&self) -> anyhow::Result<LatestSnapshotMap>;

    /// Price history per coin
    async fn fetch_history(&self) -> anyhow::Result<HistoryMap>;
}

/// Stream of `price_update` pushes
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Subscribe to pushes; updates arrive in the order the server sent them
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceUpdate>>;
}

/// Reads `/api/latest` and `/api/history` over HTTP
pub struct HttpSnapshotApi {
    base_url: String,
    client: Client,
}

impl HttpSnapshotApi {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?;

        response
            .json::<Value>()
            .await
            .with_context(|| format!("decoding body of {}", url))
    }
}

#[async_trait]
impl SnapshotApi for HttpSnapshotApi {
    async fn fetch_latest(&self) -> anyhow::Result<LatestSnapshotMap> {
        Ok(decode_latest(&self.get_json("/api/latest").await?))
    }

    async fn fetch_history(&self) -> anyhow::Result<HistoryMap> {
        Ok(decode_history(&self.get_json("/api/history").await?))
    }
}

/// Receives `price_update` pushes over a reconnecting WebSocket
pub struct SocketSnapshotSource {
    config: WsConfig,
}

impl SocketSnapshotSource {
    /// Create a source for a WebSocket URL (`ws://host:port/ws`).
    ///
    /// Retries forever, backing off from 1 s to 30 s.
    pub fn new(url: impl Into<String>) -> Self {
        let config = WsConfig::new(url)
            .initial_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(30));
        Self { config }
    }

    /// Ping every `interval` and reconnect when no pong arrives within `timeout`
    pub fn with_keepalive(mut self, interval: Duration, timeout: Duration) -> Self {
        self.config = self.config.ping_interval(interval).pong_timeout(timeout);
        self
    }

    /// Derive the push endpoint from the server's HTTP base URL
    pub fn from_server_url(server_url: &str) -> Self {
        let base = server_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        Self::new(format!("{}/ws", ws_base))
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Decode one push frame; other events and non-JSON text are ignored
    fn parse_frame(text: &str) -> Option<PriceUpdate> {
        let frame: PushEvent<Value> = serde_json::from_str(text).ok()?;

        if frame.event != PRICE_UPDATE_EVENT {
            return None;
        }

        Some(PriceUpdate::from_value(&frame.data))
    }

    async fn run_message_loop(
        mut ws_rx: mpsc::Receiver<WsMessage>,
        update_tx: mpsc::Sender<PriceUpdate>,
    ) {
        while let Some(msg) = ws_rx.recv().await {
            match msg {
                WsMessage::Text(text) => {
                    if let Some(update) = Self::parse_frame(&text) {
                        if update_tx.send(update).await.is_err() {
                            tracing::debug!("Update receiver dropped, stopping subscription");
                            break;
                        }
                    }
                }
                WsMessage::Connected => {
                    tracing::info!("Price updates connected");
                }
                WsMessage::Disconnected => {
                    tracing::warn!("Price updates disconnected");
                    break;
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::warn!(attempt, "Price updates reconnecting...");
                }
            }
        }
    }
}

#[async_trait]
impl SnapshotSource for SocketSnapshotSource {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceUpdate>> {
        let (update_tx, update_rx) = mpsc::channel(64);

        let client = WsClient::new(self.config.clone());
        tracing::info!(url = %client.url(), "Subscribing to price updates");

        let ws_rx = client.connect();

        tokio::spawn(async move {
            Self::run_message_loop(ws_rx, update_tx).await;
        });

        Ok(update_rx)
    }
}

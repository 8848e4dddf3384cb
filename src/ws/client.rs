//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Why a healthy connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// The consumer dropped its receiver
    ConsumerGone,
    /// The server closed the socket
    ClosedByPeer,
}

/// Exponential backoff between reconnection attempts
#[derive(Debug)]
struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
            attempts: 0,
        }
    }

    /// Register a failure and return the delay to wait
    fn next_delay(&mut self) -> Duration {
        self.attempts += 1;
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
        self.attempts = 0;
    }
}

/// Reconnecting WebSocket reader with ping/pong keepalive
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect in the background and return a receiver for frames and status events.
    ///
    /// The background task reconnects with exponential backoff until the
    /// receiver is dropped or `max_reconnect_attempts` consecutive attempts fail.
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, tx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        rx
    }

    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        let mut backoff = Backoff::new(config.initial_reconnect_delay, config.max_reconnect_delay);

        loop {
            let failure = match Self::connect_and_stream(&config, &tx, &mut backoff).await {
                Ok(StreamEnd::ConsumerGone) => {
                    tracing::debug!("Receiver dropped, closing connection");
                    return Ok(());
                }
                Ok(StreamEnd::ClosedByPeer) => {
                    tracing::info!("WebSocket closed by server");
                    None
                }
                Err(e) => Some(e),
            };

            if tx.is_closed() {
                return Ok(());
            }

            let delay = backoff.next_delay();
            let attempt = backoff.attempts;

            if let Some(e) = &failure {
                tracing::warn!(error = %e, attempt, "WebSocket connection error, reconnecting...");
            }

            if config.max_reconnect_attempts > 0 && attempt > config.max_reconnect_attempts {
                tracing::error!("Max reconnection attempts reached");
                let _ = tx.send(WsMessage::Disconnected).await;
                return Err(WsError::MaxReconnectsExceeded);
            }

            if tx.send(WsMessage::Reconnecting { attempt }).await.is_err() {
                return Ok(());
            }
            sleep(delay).await;
        }
    }

    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
        backoff: &mut Backoff,
    ) -> Result<StreamEnd, WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();
        backoff.reset();

        tracing::info!("WebSocket connected");
        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(StreamEnd::ConsumerGone);
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately; skip it so the first ping waits a full interval
        ping_interval.tick().await;

        let mut pong_deadline: Option<Instant> = None;

        loop {
            let deadline = pong_deadline;
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                return Ok(StreamEnd::ConsumerGone);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            pong_deadline = None;
                        }
                        Some(Ok(Message::Close(_))) => {
                            return Ok(StreamEnd::ClosedByPeer);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + config.pong_timeout);
                    }
                }

                _ = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    return Err(WsError::PongTimeout);
                }

                _ = tx.closed() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::ConsumerGone);
                }
            }
        }
    }
}

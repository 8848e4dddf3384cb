//! Fan-out of price updates to connected dashboards

use crate::market::PriceUpdate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Push event name carried by every update frame
pub const PRICE_UPDATE_EVENT: &str = "price_update";

const CHANNEL_CAPACITY: usize = 16;

/// A named push event as sent over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent<T> {
    pub event: String,
    #[serde(default)]
    pub data: T,
}

/// Broadcast hub for encoded `price_update` frames.
///
/// Each subscriber owns a FIFO receiver, so frames reach a connection in
/// publish order. Clone-able via the inner sender.
#[derive(Clone)]
pub struct UpdateHub {
    tx: broadcast::Sender<Arc<str>>,
}

impl UpdateHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future frames
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Encode and publish an update, returning how many subscribers got it.
    /// Returns 0 when nobody is connected.
    pub fn publish(&self, update: &PriceUpdate) -> usize {
        match encode_update(update) {
            Ok(frame) => self.tx.send(Arc::from(frame)).unwrap_or(0),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode price update");
                0
            }
        }
    }
}

impl Default for UpdateHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an update as a `price_update` frame
pub fn encode_update(update: &PriceUpdate) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PushEvent {
        event: PRICE_UPDATE_EVENT.to_string(),
        data: update,
    })
}

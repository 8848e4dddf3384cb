//! In-memory snapshot and history store

use super::{CoinSnapshot, HistoryMap, HistoryPoint, LatestSnapshotMap, PriceUpdate};
use std::collections::VecDeque;
use tokio::sync::{RwLock, RwLockWriteGuard};

/// Smallest step used to keep per-coin timestamps strictly increasing
const TIMESTAMP_NUDGE: f64 = 1e-3;

#[derive(Debug, Default)]
struct MarketState {
    latest: LatestSnapshotMap,
    history: std::collections::BTreeMap<String, VecDeque<HistoryPoint>>,
}

/// Latest snapshots and capped per-coin price history.
///
/// There is a single writer (the poller). Readers take point-in-time copies.
#[derive(Debug)]
pub struct PriceStore {
    state: RwLock<MarketState>,
    history_limit: usize,
}

impl PriceStore {
    /// Create an empty store keeping at most `history_limit` points per coin
    pub fn new(history_limit: usize) -> Self {
        Self {
            state: RwLock::new(MarketState::default()),
            history_limit: history_limit.max(1),
        }
    }

    /// Maximum points kept per coin
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Copy of the latest snapshot map
    pub async fn latest(&self) -> LatestSnapshotMap {
        self.state.read().await.latest.clone()
    }

    /// Copy of the full history map
    pub async fn history(&self) -> HistoryMap {
        Self::history_map(&*self.state.read().await)
    }

    /// History of one coin, `None` when the coin has never been stored
    pub async fn coin_history(&self, coin: &str) -> Option<Vec<HistoryPoint>> {
        let state = self.state.read().await;
        state
            .history
            .get(coin)
            .map(|series| series.iter().copied().collect())
    }

    /// Latest snapshots and history as one consistent update
    pub async fn snapshot(&self) -> PriceUpdate {
        let state = self.state.read().await;
        PriceUpdate {
            latest_data: state.latest.clone(),
            price_history: Self::history_map(&state),
        }
    }

    /// Begin an exclusive update; readers wait until the writer is dropped
    pub async fn write(&self) -> StoreWriter<'_> {
        StoreWriter {
            state: self.state.write().await,
            history_limit: self.history_limit,
        }
    }

    fn history_map(state: &MarketState) -> HistoryMap {
        state
            .history
            .iter()
            .map(|(coin, series)| (coin.clone(), series.iter().copied().collect()))
            .collect()
    }
}

/// Exclusive handle used by the poller to apply one cycle atomically
pub struct StoreWriter<'a> {
    state: RwLockWriteGuard<'a, MarketState>,
    history_limit: usize,
}

impl StoreWriter<'_> {
    /// Append a price to a coin's history and return the coin's prices, oldest first.
    ///
    /// A timestamp at or before the last stored one is moved just past it.
    pub fn append_point(&mut self, coin: &str, timestamp: f64, price: f64) -> Vec<f64> {
        let series = self.state.history.entry(coin.to_string()).or_default();

        let timestamp = match series.back() {
            Some(last) if timestamp <= last.timestamp => last.timestamp + TIMESTAMP_NUDGE,
            _ => timestamp,
        };

        series.push_back(HistoryPoint { timestamp, price });
        while series.len() > self.history_limit {
            series.pop_front();
        }

        series.iter().map(|p| p.price).collect()
    }

    /// Replace a coin's latest snapshot
    pub fn set_snapshot(&mut self, snapshot: CoinSnapshot) {
        self.state.latest.insert(snapshot.coin_id.clone(), snapshot);
    }

    /// Total number of stored history points across coins
    pub fn history_len(&self) -> usize {
        self.state.history.values().map(VecDeque::len).sum()
    }

    /// Current contents as a push payload
    pub fn to_update(&self) -> PriceUpdate {
        PriceUpdate {
            latest_data: self.state.latest.clone(),
            price_history: PriceStore::history_map(&self.state),
        }
    }
}

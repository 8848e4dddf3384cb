//! Renderer state

use crate::market::{HistoryMap, HistoryPoint};

/// What the dashboard currently holds: the charted coin and the last history received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererState {
    pub selected_coin: String,
    pub price_history: HistoryMap,
}

impl RendererState {
    pub fn new(default_coin: impl Into<String>) -> Self {
        Self {
            selected_coin: default_coin.into(),
            price_history: HistoryMap::new(),
        }
    }

    /// History of the selected coin; `None` when it has no points
    pub fn selected_series(&self) -> Option<&[HistoryPoint]> {
        self.price_history
            .get(&self.selected_coin)
            .map(Vec::as_slice)
            .filter(|points| !points.is_empty())
    }
}

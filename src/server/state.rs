//! Shared state handed to every handler

use super::UpdateHub;
use crate::config::Config;
use crate::market::PriceStore;
use std::sync::Arc;

/// Shared application state, passed to handlers via `axum::extract::State`
pub struct AppState {
    pub store: Arc<PriceStore>,
    pub hub: UpdateHub,
    /// Coin charted on the server-rendered page
    pub default_coin: String,
    /// Reload interval for the server-rendered page, in seconds
    pub refresh_secs: u64,
}

impl AppState {
    pub fn new(store: Arc<PriceStore>, hub: UpdateHub, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            store,
            hub,
            default_coin: config.server.default_coin.clone(),
            refresh_secs: config.poller.interval_secs.max(1),
        })
    }
}

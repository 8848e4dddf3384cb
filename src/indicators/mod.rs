//! Technical indicators
//!
//! RSI and short/long simple moving averages computed from a coin's raw
//! price history. Indicators with too little history are `None`.

mod rsi;
mod sma;

pub use rsi::rsi;
pub use sma::sma;

use crate::config::IndicatorConfig;
use serde::{Deserialize, Serialize};

/// Indicator values for one coin at one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

/// Compute every indicator over `prices` (oldest first).
pub fn compute_indicators(prices: &[f64], config: &IndicatorConfig) -> IndicatorSet {
    IndicatorSet {
        rsi: rsi(prices, config.rsi_period),
        ma_short: sma(prices, config.ma_short),
        ma_long: sma(prices, config.ma_long),
    }
}

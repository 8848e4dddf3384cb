//! Simple moving average

/// Mean of the last `period` prices, or `None` with fewer points.
pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let tail = &prices[prices.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

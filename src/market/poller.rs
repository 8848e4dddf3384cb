//! Periodic price polling, indicator computation and fan-out

use super::{CoinSnapshot, PriceStore};
use crate::alerts::{evaluate_alerts, Alert, AlertKind};
use crate::config::{AlertsConfig, Config, IndicatorConfig};
use crate::feed::{FeedError, PriceSource};
use crate::indicators::compute_indicators;
use crate::server::UpdateHub;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Outcome of one successful poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Coins whose snapshot was replaced
    pub coins_updated: usize,
    /// Alerts that fired this cycle
    pub alerts_fired: usize,
    /// Connected clients the update was pushed to
    pub receivers: usize,
}

/// Polls the upstream source and keeps the store and all clients current
pub struct Poller {
    source: Arc<dyn PriceSource>,
    store: Arc<PriceStore>,
    hub: UpdateHub,
    coins: Vec<String>,
    currencies: Vec<String>,
    indicators: IndicatorConfig,
    alerts: AlertsConfig,
    interval: Duration,
}

impl Poller {
    /// Create a poller for the coins, currencies and thresholds in `config`
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<PriceStore>,
        hub: UpdateHub,
        config: &Config,
    ) -> Self {
        Self {
            source,
            store,
            hub,
            coins: config.tracked_coins(),
            currencies: config.quote_currencies(),
            indicators: config.indicators,
            alerts: config.alerts.clone(),
            interval: Duration::from_secs(config.poller.interval_secs.max(1)),
        }
    }

    /// Override the poll interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one cycle: fetch, compute, store, broadcast.
    ///
    /// On upstream failure nothing is stored or broadcast and the previous
    /// snapshots stay in place.
    pub async fn poll_cycle(&self) -> Result<CycleReport, FeedError> {
        let started = Instant::now();

        let quotes = match self.source.fetch_quotes(&self.coins, &self.currencies).await {
            Ok(quotes) => quotes,
            Err(e) => {
                telemetry::increment(CounterMetric::PollFailed, 1);
                return Err(e);
            }
        };
        telemetry::record_latency(LatencyMetric::Upstream, started.elapsed());

        let timestamp = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        let mut alerts_fired = 0;

        let mut writer = self.store.write().await;
        let coins_updated = quotes.len();

        for quote in quotes {
            let prices = writer.append_point(&quote.coin_id, timestamp, quote.price_usd);
            let indicators = compute_indicators(&prices, &self.indicators);
            let alerts = evaluate_alerts(quote.price_usd, self.alerts.get(&quote.coin_id));

            for alert in &alerts {
                log_alert(&quote.coin_id, quote.price_usd, alert);
            }
            alerts_fired += alerts.len();

            writer.set_snapshot(CoinSnapshot::from_quote(quote, indicators, alerts));
        }

        let update = writer.to_update();
        let history_points = writer.history_len();

        // Broadcast under the write lock so frames leave in cycle order.
        let receivers = self.hub.publish(&update);
        drop(writer);

        telemetry::increment(CounterMetric::PollSucceeded, 1);
        telemetry::increment(CounterMetric::AlertsFired, alerts_fired as u64);
        telemetry::set_gauge(GaugeMetric::TrackedCoins, update.latest_data.len() as f64);
        telemetry::set_gauge(GaugeMetric::HistoryPoints, history_points as f64);
        telemetry::record_latency(LatencyMetric::PollCycle, started.elapsed());

        tracing::debug!(
            coins = coins_updated,
            alerts = alerts_fired,
            receivers,
            "Poll cycle complete"
        );

        Ok(CycleReport {
            coins_updated,
            alerts_fired,
            receivers,
        })
    }

    /// Poll immediately, then every interval, until `shutdown` resolves
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            coins = self.coins.len(),
            interval_secs = self.interval.as_secs(),
            "Price poller started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Price poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_cycle().await {
                        tracing::error!(error = %e, "Poll cycle skipped");
                    }
                }
            }
        }
    }
}

fn log_alert(coin: &str, price: f64, alert: &Alert) {
    let direction = match alert.kind {
        AlertKind::High => "above",
        AlertKind::Low => "below",
    };
    tracing::warn!(
        coin = %coin,
        price,
        threshold = alert.threshold,
        "ALERT: {} price ({}) is {} {}",
        coin,
        price,
        direction,
        alert.threshold
    );
}

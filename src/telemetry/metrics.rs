//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Upstream price API round trip
    Upstream,
    /// Whole poll cycle including store update and broadcast
    PollCycle,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Poll cycles that updated the store
    PollSucceeded,
    /// Poll cycles skipped because upstream was unavailable
    PollFailed,
    /// Alerts fired across all coins
    AlertsFired,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Coins with a current snapshot
    TrackedCoins,
    /// History points held in memory
    HistoryPoints,
    /// Open push connections
    ConnectedClients,
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::Upstream => "coindash_upstream_latency_ms",
        LatencyMetric::PollCycle => "coindash_poll_cycle_latency_ms",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::PollSucceeded => "coindash_poll_success_total",
        CounterMetric::PollFailed => "coindash_poll_failure_total",
        CounterMetric::AlertsFired => "coindash_alerts_fired_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::TrackedCoins => "coindash_tracked_coins",
        GaugeMetric::HistoryPoints => "coindash_history_points",
        GaugeMetric::ConnectedClients => "coindash_connected_clients",
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(latency_name(metric)).record(duration.as_secs_f64() * 1000.0);
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    metrics::counter!(counter_name(metric)).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Adjust a gauge by a signed delta
pub fn adjust_gauge(metric: GaugeMetric, delta: f64) {
    let gauge = metrics::gauge!(gauge_name(metric));
    if delta >= 0.0 {
        gauge.increment(delta);
    } else {
        gauge.decrement(-delta);
    }
}

/// Install the Prometheus exporter with an HTTP listener on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

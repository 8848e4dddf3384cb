//! Integration tests for the dashboard renderer

use async_trait::async_trait;
use coin_dashboard::alerts::{Alert, AlertKind};
use coin_dashboard::dashboard::{
    ChartFigure, Dashboard, HtmlPage, RenderSurface, SnapshotApi, SnapshotSource,
};
use coin_dashboard::market::{CoinSnapshot, HistoryMap, HistoryPoint, LatestSnapshotMap, PriceUpdate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

/// Counts each region replacement and keeps the last content
#[derive(Default)]
struct CountingSurface {
    table: Option<String>,
    chart: Option<ChartFigure>,
    alerts: Option<String>,
    table_renders: usize,
    chart_renders: usize,
    alert_renders: usize,
    /// Region names in render order
    order: Vec<&'static str>,
}

impl RenderSurface for CountingSurface {
    fn replace_table(&mut self, rows: String) {
        self.table = Some(rows);
        self.table_renders += 1;
        self.order.push("table");
    }

    fn replace_chart(&mut self, figure: ChartFigure) {
        self.chart = Some(figure);
        self.chart_renders += 1;
        self.order.push("chart");
    }

    fn replace_alerts(&mut self, alerts: String) {
        self.alerts = Some(alerts);
        self.alert_renders += 1;
        self.order.push("alerts");
    }
}

/// Canned reads with per-endpoint delays and failure switches
struct MockApi {
    latest: LatestSnapshotMap,
    history: HistoryMap,
    latest_delay: Duration,
    history_delay: Duration,
    fail_latest: bool,
    fail_history: bool,
    requests: AtomicUsize,
}

impl MockApi {
    fn new() -> Self {
        Self {
            latest: latest(),
            history: history(),
            latest_delay: Duration::ZERO,
            history_delay: Duration::ZERO,
            fail_latest: false,
            fail_history: false,
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SnapshotApi for MockApi {
    async fn fetch_latest(&self) -> anyhow::Result<LatestSnapshotMap> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latest_delay).await;
        if self.fail_latest {
            anyhow::bail!("connection refused");
        }
        Ok(self.latest.clone())
    }

    async fn fetch_history(&self) -> anyhow::Result<HistoryMap> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.history_delay).await;
        if self.fail_history {
            anyhow::bail!("HTTP 500");
        }
        Ok(self.history.clone())
    }
}

/// Hands out a queue of pre-built updates once
struct QueuedSource {
    updates: Mutex<Option<Vec<PriceUpdate>>>,
}

#[async_trait]
impl SnapshotSource for QueuedSource {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceUpdate>> {
        let updates = self.updates.lock().unwrap().take().unwrap_or_default();
        let (tx, rx) = mpsc::channel(updates.len().max(1));
        for update in updates {
            tx.send(update).await?;
        }
        Ok(rx)
    }
}

fn latest() -> LatestSnapshotMap {
    let mut latest = LatestSnapshotMap::new();
    latest.insert(
        "bitcoin".to_string(),
        CoinSnapshot {
            coin_id: "bitcoin".to_string(),
            price_usd: 1234.5,
            change_24h_pct: -3.456,
            alerts: vec![
                Alert {
                    kind: AlertKind::High,
                    threshold: 50_000.0,
                },
                Alert {
                    kind: AlertKind::Low,
                    threshold: 40_000.0,
                },
            ],
            ..Default::default()
        },
    );
    latest.insert(
        "ethereum".to_string(),
        CoinSnapshot {
            coin_id: "ethereum".to_string(),
            price_usd: 3_000.0,
            change_24h_pct: 2.0,
            ..Default::default()
        },
    );
    latest
}

fn history() -> HistoryMap {
    let mut history = HistoryMap::new();
    history.insert(
        "bitcoin".to_string(),
        vec![
            HistoryPoint {
                timestamp: 1.0,
                price: 1200.0,
            },
            HistoryPoint {
                timestamp: 2.0,
                price: 1234.5,
            },
        ],
    );
    history.insert(
        "ethereum".to_string(),
        vec![HistoryPoint {
            timestamp: 1.0,
            price: 3_000.0,
        }],
    );
    history
}

#[tokio::test]
async fn test_initial_load_renders_every_region() {
    let api = MockApi::new();
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());

    dashboard.load_initial(&api).await;

    let surface = dashboard.surface();
    let table = surface.table.as_deref().unwrap();
    assert_eq!(table.matches("<tr ").count(), 2);
    assert!(table.contains("<td>Bitcoin</td>"));
    assert!(table.contains("<td>Ethereum</td>"));
    assert!(table.contains("$1,234.50"));
    assert!(table.contains("<span class=\"negative-change\">-3.46%</span>"));
    assert!(table.contains("<span class=\"positive-change\">+2.00%</span>"));

    let alerts = surface.alerts.as_deref().unwrap();
    let above = alerts.find("above $50,000.00").unwrap();
    let below = alerts.find("below $40,000.00").unwrap();
    assert!(above < below);

    assert_eq!(surface.chart.as_ref().unwrap().coin(), Some("bitcoin"));
    assert_eq!(api.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_initial_reads_render_as_they_arrive() {
    let mut api = MockApi::new();
    api.latest_delay = Duration::from_millis(100);
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());

    dashboard.load_initial(&api).await;

    assert_eq!(dashboard.surface().order, vec!["chart", "table", "alerts"]);
}

#[tokio::test]
async fn test_initial_reads_are_concurrent() {
    let mut api = MockApi::new();
    api.latest_delay = Duration::from_millis(200);
    api.history_delay = Duration::from_millis(200);
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());

    let started = tokio::time::Instant::now();
    dashboard.load_initial(&api).await;

    assert!(started.elapsed() < Duration::from_millis(390));
}

#[tokio::test]
async fn test_failed_read_leaves_region_empty() {
    let mut api = MockApi::new();
    api.fail_history = true;
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());

    dashboard.load_initial(&api).await;

    let surface = dashboard.surface();
    assert!(surface.table.is_some());
    assert!(surface.alerts.is_some());
    assert!(surface.chart.is_none());
    assert!(dashboard.state().price_history.is_empty());
}

#[tokio::test]
async fn test_both_reads_failing_renders_nothing() {
    let mut api = MockApi::new();
    api.fail_latest = true;
    api.fail_history = true;
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());

    dashboard.load_initial(&api).await;

    assert!(dashboard.surface().order.is_empty());
}

#[tokio::test]
async fn test_select_coin_needs_no_network() {
    let api = MockApi::new();
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());
    dashboard.load_initial(&api).await;
    let requests = api.requests.load(Ordering::SeqCst);

    dashboard.select_coin("ethereum");

    assert_eq!(api.requests.load(Ordering::SeqCst), requests);
    let chart = dashboard.surface().chart.as_ref().unwrap();
    assert_eq!(chart.coin(), Some("ethereum"));
    assert_eq!(chart.layout.title, "ETHEREUM Price History");
    assert_eq!(chart.data[0].y, vec![3_000.0]);
}

#[tokio::test]
async fn test_push_with_empty_history_keeps_chart() {
    let api = MockApi::new();
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());
    dashboard.load_initial(&api).await;
    let chart_before = dashboard.surface().chart.clone();

    let source = QueuedSource {
        updates: Mutex::new(Some(vec![PriceUpdate {
            latest_data: latest(),
            price_history: HistoryMap::new(),
        }])),
    };
    let mut updates = source.subscribe().await.unwrap();
    dashboard.apply_update(updates.recv().await.unwrap());

    let surface = dashboard.surface();
    assert_eq!(surface.chart, chart_before);
    assert_eq!(surface.chart_renders, 1);
    assert_eq!(surface.table_renders, 2);
    assert_eq!(surface.alert_renders, 2);
}

#[tokio::test]
async fn test_pushes_apply_in_arrival_order() {
    let mut dashboard = Dashboard::new("bitcoin", HtmlPage::new());

    let pushes = [45_000.0, 46_000.0, 47_000.0]
        .into_iter()
        .map(|price| {
            let mut latest = LatestSnapshotMap::new();
            latest.insert(
                "bitcoin".to_string(),
                CoinSnapshot {
                    coin_id: "bitcoin".to_string(),
                    price_usd: price,
                    ..Default::default()
                },
            );
            let mut history = HistoryMap::new();
            history.insert(
                "bitcoin".to_string(),
                vec![HistoryPoint {
                    timestamp: price,
                    price,
                }],
            );
            PriceUpdate {
                latest_data: latest,
                price_history: history,
            }
        })
        .collect();

    let source = QueuedSource {
        updates: Mutex::new(Some(pushes)),
    };
    let mut updates = source.subscribe().await.unwrap();
    while let Ok(update) = updates.try_recv() {
        dashboard.apply_update(update);
    }

    let page = dashboard.surface();
    assert!(page.table().contains("$47,000.00"));
    assert!(!page.table().contains("$45,000.00"));
    assert_eq!(page.chart().unwrap().data[0].y, vec![47_000.0]);
}

#[tokio::test]
async fn test_selection_survives_pushes() {
    let api = MockApi::new();
    let mut dashboard = Dashboard::new("bitcoin", CountingSurface::default());
    dashboard.load_initial(&api).await;
    dashboard.select_coin("ethereum");

    dashboard.apply_update(PriceUpdate {
        latest_data: latest(),
        price_history: history(),
    });

    assert_eq!(dashboard.state().selected_coin, "ethereum");
    assert_eq!(
        dashboard.surface().chart.as_ref().unwrap().coin(),
        Some("ethereum")
    );
}

//! Integration tests for the HTTP and WebSocket server

use coin_dashboard::alerts::{Alert, AlertKind};
use coin_dashboard::config::Config;
use coin_dashboard::market::{CoinSnapshot, PriceStore};
use coin_dashboard::server::{self, AppState, UpdateHub};
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    base_url: String,
    _shutdown: oneshot::Sender<()>,
}

async fn start_server(store: Arc<PriceStore>, hub: UpdateHub) -> TestServer {
    let state = AppState::new(store, hub, &Config::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(server::serve(listener, state, async move {
        let _ = rx.await;
    }));

    TestServer {
        base_url: format!("http://{}", addr),
        _shutdown: tx,
    }
}

async fn seeded_store() -> Arc<PriceStore> {
    let store = Arc::new(PriceStore::new(100));
    {
        let mut writer = store.write().await;
        writer.append_point("bitcoin", 1_700_000_000.0, 45_000.0);
        writer.append_point("bitcoin", 1_700_000_060.0, 45_500.0);
        writer.set_snapshot(CoinSnapshot {
            coin_id: "bitcoin".to_string(),
            price_usd: 45_500.0,
            change_24h_pct: 1.25,
            alerts: vec![Alert {
                kind: AlertKind::High,
                threshold: 45_000.0,
            }],
            quotes: BTreeMap::from([("eur".to_string(), 41_000.0)]),
            ..Default::default()
        });
    }
    store
}

async fn wait_for_receivers(hub: &UpdateHub, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.receiver_count() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client never subscribed");
}

#[tokio::test]
async fn test_reads_are_empty_before_first_poll() {
    let server = start_server(Arc::new(PriceStore::new(100)), UpdateHub::new()).await;

    for path in ["/api/latest", "/api/history"] {
        let body: Value = reqwest::get(format!("{}{}", server.base_url, path))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({}), "{} should be empty", path);
    }
}

#[tokio::test]
async fn test_health() {
    let server = start_server(Arc::new(PriceStore::new(100)), UpdateHub::new()).await;

    let body: Value = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_latest_and_history_wire_format() {
    let server = start_server(seeded_store().await, UpdateHub::new()).await;

    let latest: Value = reqwest::get(format!("{}/api/latest", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let btc = &latest["bitcoin"];
    assert_eq!(btc["usd"], 45_500.0);
    assert_eq!(btc["usd_24h_change"], 1.25);
    assert!(btc["rsi"].is_null());
    assert_eq!(btc["alerts"], json!([{ "type": "high", "threshold": 45_000.0 }]));
    assert_eq!(btc["eur"], 41_000.0);

    let history: Value = reqwest::get(format!("{}/api/history", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let series = history["bitcoin"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["price"], 45_000.0);
    assert_eq!(series[1]["timestamp"], 1_700_000_060.0);
}

#[tokio::test]
async fn test_chart_for_known_and_unknown_coin() {
    let server = start_server(seeded_store().await, UpdateHub::new()).await;

    let response = reqwest::get(format!("{}/api/chart/bitcoin", server.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let figure: Value = response.json().await.unwrap();
    assert_eq!(figure["layout"]["title"], "BITCOIN Price History");
    assert_eq!(figure["data"][0]["y"], json!([45_000.0, 45_500.0]));

    let response = reqwest::get(format!("{}/api/chart/dogecoin", server.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No data available" }));
}

#[tokio::test]
async fn test_index_renders_dashboard() {
    let server = start_server(seeded_store().await, UpdateHub::new()).await;

    let html = reqwest::get(format!("{}/", server.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("<tr data-coin=\"bitcoin\""));
    assert!(html.contains("$45,500.00"));
    assert!(html.contains("above $45,000.00"));
    assert!(html.contains("BITCOIN Price History"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = start_server(Arc::new(PriceStore::new(100)), UpdateHub::new()).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/latest", server.base_url))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_websocket_receives_updates_in_order() {
    let store = seeded_store().await;
    let hub = UpdateHub::new();
    let server = start_server(store.clone(), hub.clone()).await;

    let ws_url = server.base_url.replace("http://", "ws://") + "/ws";
    let (mut socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
    wait_for_receivers(&hub, 1).await;

    for price in [46_000.0, 47_000.0] {
        let mut writer = store.write().await;
        writer.append_point("bitcoin", 1_800_000_000.0, price);
        writer.set_snapshot(CoinSnapshot {
            coin_id: "bitcoin".to_string(),
            price_usd: price,
            ..Default::default()
        });
        hub.publish(&writer.to_update());
    }

    let mut prices = Vec::new();
    while prices.len() < 2 {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no frame received")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            let frame: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(frame["event"], "price_update");
            prices.push(frame["data"]["latest_data"]["bitcoin"]["usd"].as_f64().unwrap());
            assert!(frame["data"]["price_history"]["bitcoin"].is_array());
        }
    }
    assert_eq!(prices, vec![46_000.0, 47_000.0]);
}

#[tokio::test]
async fn test_client_disconnect_releases_subscription() {
    let hub = UpdateHub::new();
    let server = start_server(Arc::new(PriceStore::new(100)), hub.clone()).await;

    let ws_url = server.base_url.replace("http://", "ws://") + "/ws";
    let (mut socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
    wait_for_receivers(&hub, 1).await;

    socket.close(None).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.receiver_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription was not released");
}

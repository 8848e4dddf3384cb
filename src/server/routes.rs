//! HTTP read endpoints

use super::{ApiError, AppState};
use crate::dashboard::{ChartFigure, Dashboard, HtmlPage};
use crate::market::{HistoryMap, LatestSnapshotMap};
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Read-only routes; none of them touch the store's contents
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/latest", get(latest))
        .route("/api/history", get(history))
        .route("/api/chart/:coin", get(chart))
}

/// Dashboard page rendered from the current store contents
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let update = state.store.snapshot().await;

    let page = HtmlPage::new().with_refresh(state.refresh_secs);
    let mut dashboard = Dashboard::new(state.default_coin.clone(), page);
    dashboard.apply_update(update);

    Html(dashboard.into_surface().to_document())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn latest(State(state): State<Arc<AppState>>) -> Json<LatestSnapshotMap> {
    Json(state.store.latest().await)
}

async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryMap> {
    Json(state.store.history().await)
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Path(coin): Path<String>,
) -> Result<Json<ChartFigure>, ApiError> {
    let points = state.store.coin_history(&coin).await.unwrap_or_default();

    ChartFigure::for_coin(&coin, &points)
        .map(Json)
        .ok_or(ApiError::NoData(coin))
}

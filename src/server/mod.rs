//! HTTP and WebSocket server
//!
//! Serves the current store contents over HTTP and pushes every poll cycle
//! to connected dashboards over `/ws`.

mod broadcast;
mod error;
mod routes;
mod state;
mod ws;

pub use broadcast::{encode_update, PushEvent, UpdateHub, PRICE_UPDATE_EVENT};
pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Assemble the full router with permissive CORS
pub fn router(state: Arc<AppState>) -> Router {
    routes::api_router()
        .route("/ws", axum::routing::get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Dashboard listening on http://{addr}");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

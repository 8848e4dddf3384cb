//! Dashboard renderer
//!
//! Turns snapshots and history into three page regions:
//! - a price table, one row per coin
//! - a price chart for the selected coin
//! - a list of active alerts
//!
//! Data arrives from a [`SnapshotApi`] (initial load) and a
//! [`SnapshotSource`] (pushes). Output goes to any [`RenderSurface`].

mod chart;
mod format;
mod render;
mod source;
mod state;
mod surface;

pub use chart::{Axis, ChartFigure, ChartLayout, ChartTrace};
pub use format::{
    capitalize, escape_html, format_change, format_number, format_optional_price, format_price,
};
pub use render::{render_alerts, render_price_table};
pub use source::{HttpSnapshotApi, SnapshotApi, SnapshotSource, SocketSnapshotSource};
pub use state::RendererState;
pub use surface::{HtmlPage, RenderSurface};

use crate::market::{HistoryMap, LatestSnapshotMap, PriceUpdate};

/// Renderer state plus the surface it draws on
pub struct Dashboard<S: RenderSurface> {
    state: RendererState,
    surface: S,
}

impl<S: RenderSurface> Dashboard<S> {
    pub fn new(default_coin: impl Into<String>, surface: S) -> Self {
        Self {
            state: RendererState::new(default_coin),
            surface,
        }
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Redraw the price table and alert list
    pub fn render_latest(&mut self, latest: &LatestSnapshotMap) {
        self.surface.replace_table(render_price_table(latest));
        self.surface.replace_alerts(render_alerts(latest));
    }

    /// Replace held history and redraw the chart
    pub fn render_history(&mut self, history: HistoryMap) {
        self.state.price_history = history;
        self.render_chart();
    }

    /// Apply a `price_update` push
    pub fn apply_update(&mut self, update: PriceUpdate) {
        self.state.price_history = update.price_history;
        self.render_latest(&update.latest_data);
        self.render_chart();
    }

    /// Chart another coin from the history already held
    pub fn select_coin(&mut self, coin: &str) {
        self.state.selected_coin = coin.to_string();
        self.render_chart();
    }

    /// Fetch latest and history concurrently, rendering each as it lands.
    ///
    /// A failed read is logged and its region left as it was.
    pub async fn load_initial<A: SnapshotApi + ?Sized>(&mut self, api: &A) {
        let latest = api.fetch_latest();
        let history = api.fetch_history();
        tokio::pin!(latest, history);

        let mut latest_done = false;
        let mut history_done = false;

        while !(latest_done && history_done) {
            tokio::select! {
                result = &mut latest, if !latest_done => {
                    latest_done = true;
                    match result {
                        Ok(latest) => self.render_latest(&latest),
                        Err(e) => tracing::error!(error = %e, "Failed to load latest prices"),
                    }
                }
                result = &mut history, if !history_done => {
                    history_done = true;
                    match result {
                        Ok(history) => self.render_history(history),
                        Err(e) => tracing::error!(error = %e, "Failed to load price history"),
                    }
                }
            }
        }
    }

    fn render_chart(&mut self) {
        let coin = &self.state.selected_coin;
        if let Some(figure) = self
            .state
            .selected_series()
            .and_then(|points| ChartFigure::for_coin(coin, points))
        {
            self.surface.replace_chart(figure);
        }
    }
}

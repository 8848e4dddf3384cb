//! Render targets

use super::chart::ChartFigure;
use super::format::escape_html;

/// The three regions a dashboard draws into.
///
/// Every call replaces the region's whole content.
pub trait RenderSurface {
    fn replace_table(&mut self, rows: String);
    fn replace_chart(&mut self, figure: ChartFigure);
    fn replace_alerts(&mut self, alerts: String);
}

/// Dashboard page held as HTML fragments
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    table: String,
    chart: Option<ChartFigure>,
    alerts: String,
    refresh_secs: Option<u64>,
}

impl HtmlPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask browsers to reload the page every `secs` seconds
    pub fn with_refresh(mut self, secs: u64) -> Self {
        self.refresh_secs = Some(secs);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn chart(&self) -> Option<&ChartFigure> {
        self.chart.as_ref()
    }

    pub fn alerts(&self) -> &str {
        &self.alerts
    }

    /// Full HTML document with all three regions
    pub fn to_document(&self) -> String {
        let refresh = self
            .refresh_secs
            .map(|s| format!("<meta http-equiv=\"refresh\" content=\"{}\">", s))
            .unwrap_or_default();

        let chart = match &self.chart {
            Some(figure) => {
                // Keep the JSON from closing the script element early
                let json = serde_json::to_string(figure)
                    .unwrap_or_default()
                    .replace("</", "<\\/");
                format!(
                    "<div id=\"price-chart\" data-coin=\"{}\">{}\
                     <script type=\"application/json\" id=\"chart-figure\">{}</script></div>",
                    escape_html(figure.coin().unwrap_or_default()),
                    figure.to_svg(800, 300),
                    json
                )
            }
            None => "<div id=\"price-chart\"></div>".to_string(),
        };

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">{refresh}\
             <title>Crypto Price Dashboard</title></head><body>\
             <h1>Crypto Price Dashboard</h1>\
             <table id=\"price-table\"><thead><tr><th>Coin</th><th>Price</th><th>24h Change</th>\
             <th>RSI</th><th>MA(7)</th><th>MA(30)</th></tr></thead><tbody>{table}</tbody></table>\
             {chart}\
             <div id=\"alerts\">{alerts}</div>\
             </body></html>\n",
            refresh = refresh,
            table = self.table,
            chart = chart,
            alerts = self.alerts,
        )
    }
}

impl RenderSurface for HtmlPage {
    fn replace_table(&mut self, rows: String) {
        self.table = rows;
    }

    fn replace_chart(&mut self, figure: ChartFigure) {
        self.chart = Some(figure);
    }

    fn replace_alerts(&mut self, alerts: String) {
        self.alerts = alerts;
    }
}

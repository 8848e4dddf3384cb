//! Single-coin price chart description

use super::format::{escape_html, format_price};
use crate::market::HistoryPoint;
use serde::{Deserialize, Serialize};

/// One line series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrace {
    /// Epoch seconds
    pub x: Vec<f64>,
    /// Prices in USD
    pub y: Vec<f64>,
    #[serde(rename = "type")]
    pub trace_type: String,
    pub name: String,
}

/// Axis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

/// Chart layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

/// Figure handed to a charting front end (plotly-compatible)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFigure {
    pub data: Vec<ChartTrace>,
    pub layout: ChartLayout,
}

impl ChartFigure {
    /// Line chart of a coin's history; `None` when there are no points
    pub fn for_coin(coin: &str, points: &[HistoryPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        Some(Self {
            data: vec![ChartTrace {
                x: points.iter().map(|p| p.timestamp).collect(),
                y: points.iter().map(|p| p.price).collect(),
                trace_type: "scatter".to_string(),
                name: coin.to_string(),
            }],
            layout: ChartLayout {
                title: format!("{} Price History", coin.to_uppercase()),
                xaxis: Axis {
                    title: "Time".to_string(),
                },
                yaxis: Axis {
                    title: "Price (USD)".to_string(),
                },
            },
        })
    }

    /// Name of the charted coin
    pub fn coin(&self) -> Option<&str> {
        self.data.first().map(|t| t.name.as_str())
    }

    /// Render the first series as an inline SVG polyline
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let Some(trace) = self.data.first() else {
            return String::new();
        };

        let (w, h) = (f64::from(width), f64::from(height));
        let (x_min, x_max) = bounds(&trace.x);
        let (y_min, y_max) = bounds(&trace.y);
        let scale = |v: f64, lo: f64, hi: f64, span: f64| {
            if hi > lo {
                (v - lo) / (hi - lo) * span
            } else {
                span / 2.0
            }
        };

        let points = trace
            .x
            .iter()
            .zip(&trace.y)
            .map(|(&x, &y)| {
                let px = scale(x, x_min, x_max, w);
                let py = h - scale(y, y_min, y_max, h);
                format!("{:.1},{:.1}", px, py)
            })
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "<svg class=\"price-chart\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" role=\"img\">\
             <title>{title}</title>\
             <polyline fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" points=\"{points}\"/>\
             <text x=\"4\" y=\"14\">{hi}</text><text x=\"4\" y=\"{bottom}\">{lo}</text>\
             </svg>",
            w = width,
            h = height,
            title = escape_html(&self.layout.title),
            points = points,
            hi = format_price(y_max),
            lo = format_price(y_min),
            bottom = height.saturating_sub(4),
        )
    }
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}

//! Region renderers: price table and alert list

use super::format::{
    capitalize, escape_html, format_change, format_number, format_optional_price, format_price,
};
use crate::alerts::AlertKind;
use crate::market::LatestSnapshotMap;

/// Render the price table body, one row per coin in map order.
///
/// Rows carry `data-coin` so a host can turn a click into a coin selection.
pub fn render_price_table(latest: &LatestSnapshotMap) -> String {
    let mut html = String::new();
    for (coin, snapshot) in latest {
        let coin_attr = escape_html(coin);
        html.push_str(&format!(
            "<tr data-coin=\"{}\" class=\"coin-row\">\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             </tr>",
            coin_attr,
            escape_html(&capitalize(coin)),
            format_price(snapshot.price_usd),
            format_change(snapshot.change_24h_pct),
            format_number(snapshot.rsi),
            format_optional_price(snapshot.ma_short),
            format_optional_price(snapshot.ma_long),
        ));
    }
    html
}

/// Render every active alert, coins in map order, alerts in snapshot order
pub fn render_alerts(latest: &LatestSnapshotMap) -> String {
    let mut html = String::new();
    for (coin, snapshot) in latest {
        for alert in &snapshot.alerts {
            let (class, direction) = match alert.kind {
                AlertKind::High => ("alert-high", "above"),
                AlertKind::Low => ("alert-low", "below"),
            };
            html.push_str(&format!(
                "<div class=\"alert {}\"><strong>{}</strong>: price {} {}</div>",
                class,
                escape_html(&capitalize(coin)),
                direction,
                format_price(alert.threshold),
            ));
        }
    }
    html
}

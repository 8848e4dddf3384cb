//! Price threshold alerts

use serde::{Deserialize, Serialize};

/// Which side of the band a price crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    High,
    Low,
}

/// An alert that fired for the current price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub threshold: f64,
}

/// Static high/low thresholds for one coin
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

/// Compare a price against thresholds.
///
/// Both bounds are inclusive. The result lists a `High` alert before a `Low`
/// one when both fire (possible only with inverted thresholds).
pub fn evaluate_alerts(price: f64, thresholds: Option<&AlertThresholds>) -> Vec<Alert> {
    let Some(thresholds) = thresholds else {
        return Vec::new();
    };

    let mut alerts = Vec::new();
    if let Some(high) = thresholds.high {
        if price >= high {
            alerts.push(Alert {
                kind: AlertKind::High,
                threshold: high,
            });
        }
    }
    if let Some(low) = thresholds.low {
        if price <= low {
            alerts.push(Alert {
                kind: AlertKind::Low,
                threshold: low,
            });
        }
    }
    alerts
}

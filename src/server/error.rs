//! HTTP API errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Nothing stored yet for the requested coin
    #[error("no data available for {0}")]
    NoData(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NoData(_) => (StatusCode::NOT_FOUND, "No data available"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

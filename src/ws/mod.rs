//! WebSocket client
//!
//! Reconnecting client used by dashboards to follow a server's push channel.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};

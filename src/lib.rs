//! coin-dashboard: live cryptocurrency price dashboard
//!
//! This library provides the core components for:
//! - Polling spot prices from CoinGecko
//! - RSI and moving-average indicators over capped history
//! - Per-coin price alerts
//! - HTTP read API and WebSocket push of every poll cycle
//! - A dashboard renderer fed by reads and pushes
//! - Structured logging and Prometheus metrics

pub mod alerts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod indicators;
pub mod market;
pub mod server;
pub mod telemetry;
pub mod ws;

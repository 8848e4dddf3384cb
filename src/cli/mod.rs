//! CLI interface for coin-dashboard
//!
//! Provides subcommands for:
//! - `serve`: Poll prices and serve the dashboard
//! - `watch`: Render a remote dashboard to an HTML file
//! - `snapshot`: One poll cycle printed as a table
//! - `config`: Show effective configuration

mod serve;
mod snapshot;
mod watch;

pub use serve::ServeArgs;
pub use snapshot::SnapshotArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coin-dashboard")]
#[command(about = "Cryptocurrency price dashboard with live updates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll prices and serve the dashboard over HTTP and WebSocket
    Serve(ServeArgs),
    /// Follow a running server and keep an HTML dashboard up to date
    Watch(WatchArgs),
    /// Fetch prices once and print them
    Snapshot(SnapshotArgs),
    /// Show effective configuration
    Config,
}

/// Resolve once Ctrl+C is pressed
pub(crate) async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping..."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

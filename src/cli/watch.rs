//! Watch command implementation

use crate::config::Config;
use crate::dashboard::{
    Dashboard, HtmlPage, HttpSnapshotApi, SnapshotSource, SocketSnapshotSource,
};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Base URL of a running `serve` instance
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Coin to chart first (defaults to `server.default_coin`)
    #[arg(long)]
    pub coin: Option<String>,

    /// HTML file rewritten after every render
    #[arg(short, long, default_value = "dashboard.html")]
    pub output: PathBuf,

    /// Seconds between keepalive pings on the push connection
    #[arg(long, default_value_t = 30)]
    pub ping_secs: u64,

    /// Seconds to wait for a pong before reconnecting
    #[arg(long, default_value_t = 10)]
    pub pong_timeout_secs: u64,
}

impl WatchArgs {
    /// Render pushes into `output`; each line on stdin selects a coin to chart
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let coin = self
            .coin
            .clone()
            .unwrap_or_else(|| config.server.default_coin.clone());

        let api = HttpSnapshotApi::new(self.server.as_str())?;
        let source = SocketSnapshotSource::from_server_url(&self.server).with_keepalive(
            Duration::from_secs(self.ping_secs.max(1)),
            Duration::from_secs(self.pong_timeout_secs.max(1)),
        );
        let mut dashboard = Dashboard::new(coin, HtmlPage::new());

        let mut updates = source.subscribe().await?;
        dashboard.load_initial(&api).await;
        write_page(&self.output, dashboard.surface()).await?;

        tracing::info!(
            server = %api.base_url(),
            output = %self.output.display(),
            "Watching price updates; type a coin id to chart it"
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(update) = update else {
                        tracing::warn!("Update stream ended");
                        break;
                    };
                    dashboard.apply_update(update);
                    write_page(&self.output, dashboard.surface()).await?;
                }

                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            let coin = line.trim().to_lowercase();
                            if !coin.is_empty() {
                                dashboard.select_coin(&coin);
                                write_page(&self.output, dashboard.surface()).await?;
                                tracing::info!(coin = %coin, "Selected coin");
                            }
                        }
                        Ok(None) => stdin_open = false,
                        Err(e) => {
                            tracing::warn!(error = %e, "Stopped reading coin selections");
                            stdin_open = false;
                        }
                    }
                }

                _ = super::shutdown_signal() => break,
            }
        }

        Ok(())
    }
}

async fn write_page(path: &Path, page: &HtmlPage) -> anyhow::Result<()> {
    tokio::fs::write(path, page.to_document())
        .await
        .with_context(|| format!("writing {}", path.display()))
}

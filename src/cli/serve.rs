//! Serve command implementation

use crate::config::Config;
use crate::feed::CoinGeckoClient;
use crate::market::{Poller, PriceStore};
use crate::server::{self, AppState, UpdateHub};
use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let source = CoinGeckoClient::with_base_url(
            config.poller.base_url.clone(),
            Duration::from_secs(config.poller.timeout_secs),
        )?;
        let store = Arc::new(PriceStore::new(config.poller.history_limit));
        let hub = UpdateHub::new();
        let poller = Poller::new(Arc::new(source), store.clone(), hub.clone(), &config);

        let addr = format!("{}:{}", config.server.bind, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {}", addr))?;

        let (stop_tx, stop_rx) = watch::channel(false);

        let poll_task = {
            let stop_rx = stop_rx.clone();
            tokio::spawn(async move { poller.run(stopped(stop_rx)).await })
        };

        tokio::spawn(async move {
            super::shutdown_signal().await;
            let _ = stop_tx.send(true);
        });

        let state = AppState::new(store, hub, &config);
        server::serve(listener, state, stopped(stop_rx)).await?;

        poll_task.await.context("poller task panicked")?;
        tracing::info!("Dashboard stopped");
        Ok(())
    }
}

/// Resolve once the stop flag is raised or its sender is gone
async fn stopped(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

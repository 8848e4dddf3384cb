//! Snapshot command implementation

use crate::config::Config;
use crate::dashboard::{capitalize, format_number, format_optional_price, format_price};
use crate::feed::CoinGeckoClient;
use crate::market::{CoinSnapshot, Poller, PriceStore};
use crate::server::UpdateHub;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Only show these coins (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub coins: Vec<String>,
}

impl SnapshotArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if !self.coins.is_empty() {
            config.poller.coins = self.coins.clone();
        }

        let source = CoinGeckoClient::with_base_url(
            config.poller.base_url.clone(),
            Duration::from_secs(config.poller.timeout_secs),
        )?;
        let store = Arc::new(PriceStore::new(config.poller.history_limit));
        let poller = Poller::new(Arc::new(source), store.clone(), UpdateHub::new(), &config);

        let report = poller.poll_cycle().await?;
        let latest = store.latest().await;

        println!(
            "{:<20} {:>16} {:>10} {:>22} {:>22}",
            "Coin", "Price", "24h", "Volume (24h)", "Market Cap"
        );
        for snapshot in latest.values() {
            println!("{}", format_row(snapshot));
            for alert in &snapshot.alerts {
                println!("  ! {:?} alert at {}", alert.kind, format_price(alert.threshold));
            }
        }
        println!(
            "\n{} coins, {} alerts",
            report.coins_updated, report.alerts_fired
        );

        Ok(())
    }
}

fn format_row(snapshot: &CoinSnapshot) -> String {
    format!(
        "{:<20} {:>16} {:>9}% {:>22} {:>22}",
        capitalize(&snapshot.coin_id),
        format_price(snapshot.price_usd),
        format_number(Some(snapshot.change_24h_pct)),
        format_optional_price(snapshot.volume_24h),
        format_optional_price(snapshot.market_cap),
    )
}

use clap::Parser;
use coin_dashboard::cli::{Cli, Commands};
use coin_dashboard::config::Config;

/// Configuration used when no config file can be read
const DEFAULT_CONFIG: &str = include_str!("../config.toml.example");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            let mut config: Config = toml::from_str(DEFAULT_CONFIG)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
    };

    // Initialize telemetry
    coin_dashboard::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!(
                coins = config.poller.coins.len(),
                interval_secs = config.poller.interval_secs,
                "Starting dashboard server"
            );
            args.execute(&config).await?;
        }
        Commands::Watch(args) => {
            tracing::info!(server = %args.server, "Starting dashboard watcher");
            args.execute(&config).await?;
        }
        Commands::Snapshot(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("# Effective configuration");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

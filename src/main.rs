use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use divscan::config::ScannerConfig;
use divscan::market::{CoinGeckoClient, KrakenClient};
use divscan::notify::Notifier;
use divscan::scanner::Scanner;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Discord webhook URL for signal and position alerts
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    webhook_url: String,

    /// Path of the persisted scanner state
    #[arg(long, default_value = "divscan_state.json")]
    state_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("divscan=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let cfg = ScannerConfig::default();
    cfg.validate()?;

    info!("Starting divergence scan");
    info!(
        "Timeframe: {} | Universe: top {} | Pivot order/count: {}/{}",
        cfg.timeframe_label(),
        cfg.universe_size,
        cfg.pivot_order,
        cfg.pivot_count
    );

    let scanner = Scanner::new(
        cfg,
        KrakenClient::new(),
        CoinGeckoClient::new(),
        Notifier::new(args.webhook_url),
    );
    scanner.run_once(&args.state_file).await?;

    info!("Scan complete");
    Ok(())
}

//! One full scan cycle
//!
//! Load state, advance every open position against fresh prices, scan the
//! rest of the universe for new divergences, persist. Collaborator failures
//! skip the affected pair; the next scheduled run is the retry mechanism.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::ScannerConfig;
use crate::detect::{classify, Signal};
use crate::indicators::{rsi, trim_warmup};
use crate::market::{closes, CoinGeckoClient, KrakenClient};
use crate::notify::{event_message, signal_message, Notifier};
use crate::store;
use crate::trading::{Position, Side, TradeBook};

pub struct Scanner {
    cfg: ScannerConfig,
    kraken: KrakenClient,
    coingecko: CoinGeckoClient,
    notifier: Notifier,
}

impl Scanner {
    pub fn new(
        cfg: ScannerConfig,
        kraken: KrakenClient,
        coingecko: CoinGeckoClient,
        notifier: Notifier,
    ) -> Self {
        Self {
            cfg,
            kraken,
            coingecko,
            notifier,
        }
    }

    /// Run one complete cycle against the state file at `state_path`.
    pub async fn run_once(&self, state_path: &Path) -> Result<()> {
        let mut book = store::load(state_path, &self.cfg);
        info!(
            "Loaded state: {} open | {}W / {}L | balance ${:.2}",
            book.active_trades.len(),
            book.wins,
            book.losses,
            book.balance
        );

        self.update_open_positions(&mut book).await;
        self.scan_for_signals(&mut book).await;

        store::save(state_path, &book)?;
        info!(
            "Saved state: {} open | {}W / {}L | balance ${:.2}",
            book.active_trades.len(),
            book.wins,
            book.losses,
            book.balance
        );
        Ok(())
    }

    /// Advance every open position one rung against its latest price.
    /// A pair whose price cannot be fetched is left untouched for this cycle.
    async fn update_open_positions(&self, book: &mut TradeBook) {
        let symbols: Vec<String> = book.active_trades.keys().cloned().collect();

        for symbol in symbols {
            let price = match self.kraken.fetch_last_price(&symbol).await {
                Ok(price) => price,
                Err(e) => {
                    warn!("No price for open position {}: {:#}", symbol, e);
                    continue;
                }
            };

            if let Some(event) = book.update(&symbol, price, &self.cfg) {
                let message = event_message(&event);
                info!("{}", message);
                self.notifier.post(&message).await;
            } else {
                debug!("{} unchanged at {}", symbol, price);
            }
        }
    }

    /// Evaluate every universe pair without an open position and open
    /// simulated trades where a divergence prints.
    async fn scan_for_signals(&self, book: &mut TradeBook) {
        let pairs = match self.coingecko.top_pairs(&self.cfg).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Universe fetch failed: {:#} - skipping signal scan", e);
                return;
            }
        };

        let total = pairs.len();
        info!("Scanning {} pairs for divergences", total);

        for (i, pair) in pairs.iter().enumerate() {
            if book.is_active(pair) {
                debug!("[{}/{}] {} already open, skipping", i + 1, total, pair);
                continue;
            }

            debug!("[{}/{}] Checking {}", i + 1, total, pair);
            let candles = match self
                .kraken
                .fetch_ohlcv(pair, self.cfg.timeframe_minutes, self.cfg.candle_limit)
                .await
            {
                Ok(candles) => candles,
                Err(e) => {
                    debug!("[{}/{}] {} unavailable: {:#}", i + 1, total, pair, e);
                    continue;
                }
            };

            let close_series = closes(&candles);
            let oscillator = rsi(&close_series, self.cfg.rsi_period);
            let (prices, oscillator) = trim_warmup(&close_series, &oscillator);

            let side = match classify(&prices, &oscillator, &self.cfg) {
                Signal::Long => Side::Long,
                Signal::Short => Side::Short,
                Signal::None => continue,
            };

            let Some(&entry) = prices.last() else {
                continue;
            };

            let position = Position::open(pair.clone(), side, entry, &self.cfg, Utc::now());
            let message = signal_message(&position, &self.cfg);
            info!("Divergence on {} ({}) - entry {:.6}", pair, side, entry);

            if book.open(position) {
                self.notifier.post(&message).await;
            }
        }
    }
}

//! CoinGecko markets listing
//!
//! Source of the scan universe: top coins by market capitalization, with
//! stables and wrapped variants filtered out, mapped to Kraken-style
//! `SYM/USD` pairs. One oversized page is requested so the filtered list
//! still covers the configured universe.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ScannerConfig;

/// CoinGecko public API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

/// The one field we need per market entry
#[derive(Debug, Deserialize)]
struct MarketEntry {
    symbol: String,
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
        }
    }

    /// Ordered scan universe: top pairs by market cap, exclusions dropped.
    pub async fn top_pairs(&self, cfg: &ScannerConfig) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/v3/coins/markets", self.base_url))
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", &cfg.markets_per_page.to_string()),
                ("page", "1"),
            ])
            .send()
            .await
            .context("Markets request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Markets request returned {}", status);
        }

        let entries: Vec<MarketEntry> = response
            .json()
            .await
            .context("Failed to parse markets response")?;

        Ok(filter_pairs(entries, cfg))
    }
}

fn filter_pairs(entries: Vec<MarketEntry>, cfg: &ScannerConfig) -> Vec<String> {
    let excluded = ScannerConfig::excluded_symbols();
    entries
        .into_iter()
        .filter(|entry| {
            let symbol = entry.symbol.to_lowercase();
            !excluded.iter().any(|x| *x == symbol)
        })
        .map(|entry| format!("{}/USD", entry.symbol.to_uppercase()))
        .take(cfg.universe_size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(symbols: &[&str]) -> Vec<MarketEntry> {
        symbols
            .iter()
            .map(|s| MarketEntry {
                symbol: s.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_exclusions_and_pair_format() {
        let cfg = ScannerConfig::default();
        let pairs = filter_pairs(entries(&["btc", "usdt", "eth", "wbtc", "sol"]), &cfg);
        assert_eq!(pairs, vec!["BTC/USD", "ETH/USD", "SOL/USD"]);
    }

    #[test]
    fn test_universe_size_truncation() {
        let cfg = ScannerConfig {
            universe_size: 2,
            ..Default::default()
        };
        let pairs = filter_pairs(entries(&["btc", "eth", "sol", "ada"]), &cfg);
        assert_eq!(pairs, vec!["BTC/USD", "ETH/USD"]);
    }

    #[test]
    fn test_market_order_preserved() {
        let cfg = ScannerConfig::default();
        let pairs = filter_pairs(entries(&["eth", "btc"]), &cfg);
        assert_eq!(pairs, vec!["ETH/USD", "BTC/USD"]);
    }

    #[test]
    fn test_markets_response_shape_parses() {
        let raw = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.0},
            {"id": "tether", "symbol": "usdt", "name": "Tether", "current_price": 1.0}
        ]"#;
        let entries: Vec<MarketEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].symbol, "btc");
    }
}

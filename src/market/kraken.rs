//! Kraken public market-data API
//!
//! Two endpoints: OHLC history and the ticker's last trade. Kraken wraps every
//! response in `{error: [...], result: {...}}` and keys the result by its own
//! internal pair name (e.g. `XXBTZUSD` for `BTCUSD`), so the payload is
//! located by taking the single entry that is not the `last` cursor.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::Candle;

/// Kraken public API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Envelope shared by all Kraken public endpoints
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    #[serde(default)]
    result: serde_json::Map<String, Value>,
}

pub struct KrakenClient {
    client: Client,
    base_url: String,
}

impl Default for KrakenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KrakenClient {
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

    /// Kraken spells pairs without the separator ("BTC/USD" -> "BTCUSD")
    fn kraken_pair(pair: &str) -> String {
        pair.replace('/', "")
    }

    /// Fetch OHLC history, most recent `limit` bars in chronological order.
    pub async fn fetch_ohlcv(
        &self,
        pair: &str,
        timeframe_minutes: u32,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let response = self
            .client
            .get(format!("{}/0/public/OHLC", self.base_url))
            .query(&[
                ("pair", Self::kraken_pair(pair)),
                ("interval", timeframe_minutes.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("OHLC request for {} failed", pair))?;

        let status = response.status();
        if !status.is_success() {
            bail!("OHLC request for {} returned {}", pair, status);
        }

        let body: KrakenResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse OHLC response for {}", pair))?;

        let mut candles = parse_ohlc(&body, pair)?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles.split_off(start))
    }

    /// Fetch the last traded price for a pair.
    pub async fn fetch_last_price(&self, pair: &str) -> Result<f64> {
        let response = self
            .client
            .get(format!("{}/0/public/Ticker", self.base_url))
            .query(&[("pair", Self::kraken_pair(pair))])
            .send()
            .await
            .with_context(|| format!("Ticker request for {} failed", pair))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Ticker request for {} returned {}", pair, status);
        }

        let body: KrakenResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse ticker response for {}", pair))?;

        parse_last_price(&body, pair)
    }
}

/// Pull the OHLC rows out of the response envelope.
///
/// Rows are `[time, open, high, low, close, vwap, volume, count]` with the
/// numeric fields as strings.
fn parse_ohlc(body: &KrakenResponse, pair: &str) -> Result<Vec<Candle>> {
    let rows = payload(body, pair)?
        .as_array()
        .with_context(|| format!("OHLC payload for {} is not an array", pair))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let row = row
            .as_array()
            .filter(|r| r.len() >= 7)
            .with_context(|| format!("Malformed OHLC row for {}", pair))?;

        let ts = row[0]
            .as_i64()
            .with_context(|| format!("Bad OHLC timestamp for {}", pair))?;
        let time = Utc
            .timestamp_opt(ts, 0)
            .single()
            .with_context(|| format!("OHLC timestamp out of range for {}", pair))?;

        candles.push(Candle {
            time,
            open: number(&row[1], pair)?,
            high: number(&row[2], pair)?,
            low: number(&row[3], pair)?,
            close: number(&row[4], pair)?,
            volume: number(&row[6], pair)?,
        });
    }

    Ok(candles)
}

/// Pull `c[0]` (last trade price) out of a ticker response.
fn parse_last_price(body: &KrakenResponse, pair: &str) -> Result<f64> {
    let last = payload(body, pair)?
        .get("c")
        .and_then(|c| c.get(0))
        .with_context(|| format!("Ticker for {} has no last-trade field", pair))?;
    number(last, pair)
}

/// The single non-`last` entry of the result map.
fn payload<'a>(body: &'a KrakenResponse, pair: &str) -> Result<&'a Value> {
    if !body.error.is_empty() {
        bail!("Kraken error for {}: {}", pair, body.error.join(", "));
    }
    body.result
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .map(|(_, value)| value)
        .with_context(|| format!("Empty Kraken result for {}", pair))
}

/// Kraken sends prices as strings; tolerate plain numbers too.
fn number(value: &Value, pair: &str) -> Result<f64> {
    match value {
        Value::String(s) => s
            .parse()
            .with_context(|| format!("Non-numeric field for {}: {:?}", pair, s)),
        Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("Non-numeric field for {}", pair)),
        other => bail!("Non-numeric field for {}: {:?}", pair, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_spelling() {
        assert_eq!(KrakenClient::kraken_pair("BTC/USD"), "BTCUSD");
        assert_eq!(KrakenClient::kraken_pair("SOLUSD"), "SOLUSD");
    }

    #[test]
    fn test_parse_ohlc_rows() {
        let body: KrakenResponse = serde_json::from_str(
            r#"{
                "error": [],
                "result": {
                    "XXBTZUSD": [
                        [1688671200, "30306.1", "30306.2", "30305.7", "30305.7", "30306.1", "3.39243896", 23],
                        [1688671500, "30305.8", "30306.0", "30300.0", "30302.1", "30303.5", "1.25010000", 11]
                    ],
                    "last": 1688671500
                }
            }"#,
        )
        .unwrap();

        let candles = parse_ohlc(&body, "BTC/USD").unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 30305.7);
        assert_eq!(candles[1].close, 30302.1);
        assert_eq!(candles[0].volume, 3.39243896);
        assert!(candles[0].time < candles[1].time);
    }

    #[test]
    fn test_parse_ohlc_rejects_api_error() {
        let body: KrakenResponse =
            serde_json::from_str(r#"{"error": ["EQuery:Unknown asset pair"], "result": {}}"#)
                .unwrap();
        assert!(parse_ohlc(&body, "NOPE/USD").is_err());
    }

    #[test]
    fn test_parse_ohlc_rejects_empty_result() {
        let body: KrakenResponse =
            serde_json::from_str(r#"{"error": [], "result": {"last": 0}}"#).unwrap();
        assert!(parse_ohlc(&body, "BTC/USD").is_err());
    }

    #[test]
    fn test_parse_last_price() {
        let body: KrakenResponse = serde_json::from_str(
            r#"{
                "error": [],
                "result": {
                    "XXBTZUSD": {
                        "a": ["30300.10000", "1", "1.000"],
                        "b": ["30300.00000", "1", "1.000"],
                        "c": ["30303.50000", "0.00067643"]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(parse_last_price(&body, "BTC/USD").unwrap(), 30303.5);
    }

    #[test]
    fn test_parse_last_price_missing_field() {
        let body: KrakenResponse =
            serde_json::from_str(r#"{"error": [], "result": {"XXBTZUSD": {"a": []}}}"#).unwrap();
        assert!(parse_last_price(&body, "BTC/USD").is_err());
    }
}

//! Discord notification sink
//!
//! Fire-and-forget webhook posts: a failed delivery is logged and swallowed,
//! the scan goes on. Message builders live here too so alert wording stays in
//! one place.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::config::ScannerConfig;
use crate::trading::{BookEvent, Position, Side};

pub struct Notifier {
    client: Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            webhook_url,
        }
    }

    /// Post a message, best-effort.
    pub async fn post(&self, content: &str) {
        let payload = json!({ "content": content });
        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!("Webhook returned {}", response.status());
            }
            Ok(_) => {}
            Err(e) => warn!("Webhook post failed: {}", e),
        }
    }
}

/// Alert text for a fresh divergence entry
pub fn signal_message(position: &Position, cfg: &ScannerConfig) -> String {
    let headline = match position.side {
        Side::Long => format!("🚀 {} BULLISH DIV (REVERSAL UP)", pattern_word(cfg.pivot_count)),
        Side::Short => format!("🔥 {} BEARISH DIV (REVERSAL DOWN)", pattern_word(cfg.pivot_count)),
    };

    format!(
        "## {}\n**Symbol:** {}\n**Timeframe:** {}\n**Entry:** {:.4} | **Stop:** {:.4}\n**Targets:** {:.4} / {:.4} / {:.4}\n[🔍 Open Chart]({})",
        headline,
        position.symbol,
        cfg.timeframe_label(),
        position.entry,
        position.stop,
        position.tp1,
        position.tp2,
        position.tp3,
        chart_link(&position.symbol),
    )
}

/// Alert text for a lifecycle event on a tracked position
pub fn event_message(event: &BookEvent) -> String {
    match event {
        BookEvent::Tp1Banked { symbol, realized } => format!(
            "✅ **{}** hit TP1 (+${:.2}) - stop moved to entry",
            symbol, realized
        ),
        BookEvent::Tp2Reached { symbol } => {
            format!("✅ **{}** hit TP2 - holding for the final target", symbol)
        }
        BookEvent::Tp3Closed { symbol, realized } => {
            format!("🏆 **{}** hit TP3 (+${:.2}) - position closed", symbol, realized)
        }
        BookEvent::BreakevenClosed { symbol } => {
            format!("➖ **{}** stopped at entry after TP1 - closed breakeven", symbol)
        }
        BookEvent::StopClosed { symbol, lost } => {
            format!("🛑 **{}** stopped out (-${:.2})", symbol, lost)
        }
    }
}

fn pattern_word(pivot_count: usize) -> String {
    match pivot_count {
        2 => "DOUBLE".to_string(),
        3 => "TRIPLE".to_string(),
        n => format!("{}-PIVOT", n),
    }
}

fn chart_link(pair: &str) -> String {
    format!(
        "https://www.tradingview.com/chart/?symbol=KRAKEN:{}",
        pair.replace('/', "")
    )
}

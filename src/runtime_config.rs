// =============================================================================
// Runtime Configuration — symbol universe and refresh behaviour
// =============================================================================
//
// Central configuration for the Signal Desk service. Persistence uses an
// atomic tmp + rename pattern to prevent corruption on crash. All fields
// carry `#[serde(default)]` so that adding new fields never breaks loading
// an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::SymbolInfo;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_universe() -> Vec<SymbolInfo> {
    [
        ("TSLA", "Tesla Inc"),
        ("AAPL", "Apple Inc"),
        ("NVDA", "NVIDIA Corporation"),
        ("PLTR", "Palantir Technologies"),
        ("SOFI", "SoFi Technologies"),
        ("RBLX", "Roblox Corporation"),
        ("HOOD", "Robinhood Markets"),
        ("NET", "Cloudflare Inc"),
        ("SHOP", "Shopify Inc"),
        ("SQ", "Block Inc"),
        ("PYPL", "PayPal Holdings"),
        ("ROKU", "Roku Inc"),
        ("DKNG", "DraftKings Inc"),
        ("COIN", "Coinbase Global"),
        ("U", "Unity Software"),
        ("ABNB", "Airbnb Inc"),
        ("UBER", "Uber Technologies"),
        ("LYFT", "Lyft Inc"),
        ("PINS", "Pinterest Inc"),
        ("SNAP", "Snap Inc"),
        ("TWTR", "Twitter Inc"),
        ("META", "Meta Platforms"),
        ("GOOGL", "Alphabet Inc"),
        ("AMZN", "Amazon.com Inc"),
        ("MSFT", "Microsoft Corporation"),
        ("AMD", "Advanced Micro Devices"),
        ("INTC", "Intel Corporation"),
        ("CRM", "Salesforce Inc"),
        ("SNOW", "Snowflake Inc"),
        ("ZM", "Zoom Video Communications"),
    ]
    .iter()
    .map(|(sym, name)| SymbolInfo::new(*sym, *name))
    .collect()
}

fn default_refresh_delay_ms() -> u64 {
    1000
}

fn default_long_probability() -> f64 {
    0.3
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the Signal Desk service.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Symbol universe the desk generates records for.
    #[serde(default = "default_universe")]
    pub universe: Vec<SymbolInfo>,

    /// Simulated provider latency applied by the refresh coordinator, in
    /// milliseconds.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,

    /// Probability that a symbol with no active signal is marked as a held
    /// `long` position. Stand-in for a real portfolio store.
    #[serde(default = "default_long_probability")]
    pub long_probability: f64,

    /// Interval for the background auto-refresh task, in seconds.
    /// 0 disables the task; refreshes are then manual only.
    #[serde(default)]
    pub auto_refresh_secs: u64,

    /// When true, `rvol_ok` is driven by an independent volume re-draw
    /// instead of the sample's own rvol10, reproducing the legacy mock.
    #[serde(default)]
    pub mock_volume_redraw: bool,

    /// When true, the stats row's sentiment counts are independent draws in
    /// the legacy ranges instead of being derived from change direction.
    #[serde(default)]
    pub mock_sentiment_redraw: bool,

    /// Explicit held positions. When non-empty these replace the
    /// probabilistic position store, so `long` status is deterministic.
    #[serde(default)]
    pub held_symbols: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            universe: default_universe(),
            refresh_delay_ms: default_refresh_delay_ms(),
            long_probability: default_long_probability(),
            auto_refresh_secs: 0,
            mock_volume_redraw: false,
            mock_sentiment_redraw: false,
            held_symbols: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            universe = config.universe.len(),
            refresh_delay_ms = config.refresh_delay_ms,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Restrict the universe to the given ticker symbols, preserving order
    /// and display names. Unknown tickers are kept with the ticker doubling
    /// as the display name so env overrides can introduce new symbols.
    pub fn restrict_universe(&mut self, symbols: &[String]) {
        let mut restricted = Vec::with_capacity(symbols.len());
        for sym in symbols {
            match self.universe.iter().find(|info| &info.symbol == sym) {
                Some(info) => restricted.push(info.clone()),
                None => restricted.push(SymbolInfo::new(sym.clone(), sym.clone())),
            }
        }
        self.universe = restricted;
    }
}

// =============================================================================
// Shared types used across the Signal Desk service
// =============================================================================

use serde::{Deserialize, Serialize};

/// A symbol universe entry: ticker plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Classification of a record after signal derivation.
///
/// Precedence is fixed: `Entry` overrides `Exit` overrides `Long` overrides
/// `None`. A record satisfying both the entry and exit rules is `Entry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Entry,
    Exit,
    Long,
    None,
}

impl Default for SignalStatus {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Exit => write!(f, "exit"),
            Self::Long => write!(f, "long"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A fully derived per-symbol record: sampled indicators plus signal flags,
/// status and position.
///
/// Wire names follow the dashboard contract: `changePercent` and `marketCap`
/// are camelCase, indicator fields are lowercase as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,

    // ── Price ───────────────────────────────────────────────────────────
    pub close: f64,
    pub change: f64,
    /// `change / close * 100`, denominated in the sampled (post-change)
    /// close. Not reconstructable from `close - change`.
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
    pub volume: u64,
    #[serde(rename = "marketCap")]
    pub market_cap: u64,

    // ── Technical indicators ────────────────────────────────────────────
    pub mom21: f64,
    pub mom42: f64,
    pub mom63: f64,
    pub rsi14: f64,
    pub atr14: f64,
    pub rvol10: f64,
    pub rvol20: f64,
    pub sma50: f64,
    pub ema21: f64,
    pub macd_hist: f64,
    pub vol21: f64,

    // ── Signal flags ────────────────────────────────────────────────────
    pub trend_ok: bool,
    pub momentum_ok: bool,
    pub rvol_ok: bool,
    pub entry_signal: bool,
    pub exit_signal: bool,

    // ── Status ──────────────────────────────────────────────────────────
    pub status: SignalStatus,
    /// 1 iff `status == Long`, else 0.
    pub position: u8,

    /// RFC 3339 timestamp taken at generation time.
    pub last_updated: String,
}

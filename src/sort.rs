// =============================================================================
// Table Sorting — single-field ordering with direction toggle
// =============================================================================
//
// Orders a record batch by any single numeric or string field. Re-selecting
// the field while descending flips to ascending; selecting any other field
// resets to descending (the default direction). Sorting is non-mutating and
// stable, so equal keys keep their batch order.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::StockRecord;

/// Sortable fields of a [`StockRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Symbol,
    Close,
    Change,
    ChangePercent,
    Volume,
    MarketCap,
    Mom21,
    Mom42,
    Mom63,
    Rsi14,
    Atr14,
    Rvol10,
    Rvol20,
    Sma50,
    Ema21,
    MacdHist,
    Vol21,
}

impl SortKey {
    /// Parse a wire-form key (e.g. `"mom42"`, `"macd_hist"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "symbol" => Some(Self::Symbol),
            "close" => Some(Self::Close),
            "change" => Some(Self::Change),
            "change_percent" | "changePercent" => Some(Self::ChangePercent),
            "volume" => Some(Self::Volume),
            "market_cap" | "marketCap" => Some(Self::MarketCap),
            "mom21" => Some(Self::Mom21),
            "mom42" => Some(Self::Mom42),
            "mom63" => Some(Self::Mom63),
            "rsi14" => Some(Self::Rsi14),
            "atr14" => Some(Self::Atr14),
            "rvol10" => Some(Self::Rvol10),
            "rvol20" => Some(Self::Rvol20),
            "sma50" => Some(Self::Sma50),
            "ema21" => Some(Self::Ema21),
            "macd_hist" => Some(Self::MacdHist),
            "vol21" => Some(Self::Vol21),
            _ => None,
        }
    }
}

/// Sort direction. `Desc` is the default applied when a field is first
/// selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Current sort selection with the re-select toggle rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Mom42,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Apply a column selection: the same key while descending toggles to
    /// ascending; everything else (same key while ascending, or a new key)
    /// resets to descending.
    pub fn select(&mut self, key: SortKey) {
        self.direction = if self.key == key && self.direction == SortDirection::Desc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        self.key = key;
    }
}

/// Return a sorted copy of `records` ordered by `key` in `direction`.
///
/// Stable: ties keep their input order. The input slice is untouched.
pub fn sort_records(
    records: &[StockRecord],
    key: SortKey,
    direction: SortDirection,
) -> Vec<StockRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match key {
            SortKey::Symbol => a.symbol.cmp(&b.symbol),
            SortKey::Close => a.close.total_cmp(&b.close),
            SortKey::Change => a.change.total_cmp(&b.change),
            SortKey::ChangePercent => a.change_percent.total_cmp(&b.change_percent),
            SortKey::Volume => a.volume.cmp(&b.volume),
            SortKey::MarketCap => a.market_cap.cmp(&b.market_cap),
            SortKey::Mom21 => a.mom21.total_cmp(&b.mom21),
            SortKey::Mom42 => a.mom42.total_cmp(&b.mom42),
            SortKey::Mom63 => a.mom63.total_cmp(&b.mom63),
            SortKey::Rsi14 => a.rsi14.total_cmp(&b.rsi14),
            SortKey::Atr14 => a.atr14.total_cmp(&b.atr14),
            SortKey::Rvol10 => a.rvol10.total_cmp(&b.rvol10),
            SortKey::Rvol20 => a.rvol20.total_cmp(&b.rvol20),
            SortKey::Sma50 => a.sma50.total_cmp(&b.sma50),
            SortKey::Ema21 => a.ema21.total_cmp(&b.ema21),
            SortKey::MacdHist => a.macd_hist.total_cmp(&b.macd_hist),
            SortKey::Vol21 => a.vol21.total_cmp(&b.vol21),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    sorted
}

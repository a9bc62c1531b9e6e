// =============================================================================
// Signal Derivation — threshold rules and status precedence
// =============================================================================
//
// Classifies an indicator sample into boolean flags and a single status:
//
//   trend_ok     = mom42 > 5 && rsi14 < 70
//   momentum_ok  = mom21 > 0 && mom42 > mom21
//   rvol_ok      = relative volume > 1.2 (from the injected VolumeSource)
//   entry_signal = trend_ok && momentum_ok && rvol_ok && rsi14 < 50
//   exit_signal  = rsi14 > 75 || mom21 < -10
//
// Status precedence is fixed and must not be reordered:
// entry > exit > long (held) > none. A record satisfying both entry and
// exit rules classifies as entry.
// =============================================================================

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::sampler::IndicatorSample;
use crate::signals::sources::{PositionStore, VolumeSource};
use crate::types::{SignalStatus, StockRecord};

// ── Rule thresholds ──────────────────────────────────────────────────────────

pub const TREND_MOM42_MIN: f64 = 5.0;
pub const TREND_RSI_MAX: f64 = 70.0;
pub const ENTRY_RSI_MAX: f64 = 50.0;
pub const EXIT_RSI_MIN: f64 = 75.0;
pub const EXIT_MOM21_MAX: f64 = -10.0;
pub const RVOL_ELEVATED: f64 = 1.2;

/// The five boolean signal flags derived from one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFlags {
    pub trend_ok: bool,
    pub momentum_ok: bool,
    pub rvol_ok: bool,
    pub entry_signal: bool,
    pub exit_signal: bool,
}

/// Derive all signal flags from `sample`, reading the current relative
/// volume through `volume_source`. Pure given a pure source.
pub fn derive_flags(sample: &IndicatorSample, volume_source: &dyn VolumeSource) -> SignalFlags {
    let trend_ok = sample.mom42 > TREND_MOM42_MIN && sample.rsi14 < TREND_RSI_MAX;
    let momentum_ok = sample.mom21 > 0.0 && sample.mom42 > sample.mom21;
    let rvol_ok = volume_source.relative_volume(sample) > RVOL_ELEVATED;

    let entry_signal = trend_ok && momentum_ok && rvol_ok && sample.rsi14 < ENTRY_RSI_MAX;
    let exit_signal = sample.rsi14 > EXIT_RSI_MIN || sample.mom21 < EXIT_MOM21_MAX;

    SignalFlags {
        trend_ok,
        momentum_ok,
        rvol_ok,
        entry_signal,
        exit_signal,
    }
}

/// Resolve the status from the flags and held-position state.
///
/// Entry overrides exit overrides held-long overrides none.
pub fn resolve_status(flags: &SignalFlags, held: bool) -> SignalStatus {
    if flags.entry_signal {
        SignalStatus::Entry
    } else if flags.exit_signal {
        SignalStatus::Exit
    } else if held {
        SignalStatus::Long
    } else {
        SignalStatus::None
    }
}

/// Assemble a full [`StockRecord`] from a sample: derive flags, resolve the
/// status against the position store, and stamp the generation time.
pub fn derive_record(
    sample: IndicatorSample,
    volume_source: &dyn VolumeSource,
    position_store: &dyn PositionStore,
) -> StockRecord {
    let flags = derive_flags(&sample, volume_source);
    let held = position_store.is_held(&sample.symbol);
    let status = resolve_status(&flags, held);

    StockRecord {
        symbol: sample.symbol,
        name: sample.name,
        close: sample.close,
        change: sample.change,
        change_percent: sample.change_percent,
        volume: sample.volume,
        market_cap: sample.market_cap,
        mom21: sample.mom21,
        mom42: sample.mom42,
        mom63: sample.mom63,
        rsi14: sample.rsi14,
        atr14: sample.atr14,
        rvol10: sample.rvol10,
        rvol20: sample.rvol20,
        sma50: sample.sma50,
        ema21: sample.ema21,
        macd_hist: sample.macd_hist,
        vol21: sample.vol21,
        trend_ok: flags.trend_ok,
        momentum_ok: flags.momentum_ok,
        rvol_ok: flags.rvol_ok,
        entry_signal: flags.entry_signal,
        exit_signal: flags.exit_signal,
        status,
        position: u8::from(status == SignalStatus::Long),
        last_updated: Utc::now().to_rfc3339(),
    }
}

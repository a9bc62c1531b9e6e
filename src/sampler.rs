// =============================================================================
// Indicator Sampler — synthetic per-symbol technical indicators
// =============================================================================
//
// Produces plausible-looking indicator values for a fixed symbol universe
// with no external data dependency. Every field is an independent uniform
// draw within its documented range; SMA50 and EMA21 are scaled off the
// sampled close so they stay price-correlated.
//
// changePercent convention: the denominator is the freshly sampled close,
// not the reconstructed pre-change price. The field is therefore NOT equal
// to `change / (close - change) * 100`.
// =============================================================================

use rand::prelude::*;

use crate::types::SymbolInfo;

// ── Sampling ranges ──────────────────────────────────────────────────────────

pub const CLOSE_RANGE: (f64, f64) = (10.0, 500.0);
pub const CHANGE_RANGE: (f64, f64) = (-15.0, 15.0);
pub const MOM21_RANGE: (f64, f64) = (-20.0, 30.0);
pub const MOM42_RANGE: (f64, f64) = (-25.0, 40.0);
pub const MOM63_RANGE: (f64, f64) = (-30.0, 50.0);
pub const RSI14_RANGE: (f64, f64) = (20.0, 80.0);
pub const ATR14_RANGE: (f64, f64) = (1.0, 8.0);
pub const RVOL10_RANGE: (f64, f64) = (0.5, 3.0);
pub const RVOL20_RANGE: (f64, f64) = (0.6, 2.8);
pub const SMA50_FACTOR_RANGE: (f64, f64) = (0.9, 1.1);
pub const EMA21_FACTOR_RANGE: (f64, f64) = (0.95, 1.05);
pub const MACD_HIST_RANGE: (f64, f64) = (-2.0, 2.0);
pub const VOL21_RANGE: (f64, f64) = (0.15, 0.45);
pub const VOLUME_RANGE: (u64, u64) = (1_000_000, 50_000_000);
pub const MARKET_CAP_RANGE: (u64, u64) = (1_000_000_000, 1_000_000_000_000);

/// Raw sampled indicators for one symbol, before signal derivation.
#[derive(Debug, Clone)]
pub struct IndicatorSample {
    pub symbol: String,
    pub name: String,
    pub close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: u64,
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
}

/// Draw a full indicator sample for `info` using `rng`.
///
/// This is a closed-form sampler: any invocation succeeds, there is no
/// shared mutable state, and all values land within the range constants
/// above.
pub fn sample_indicators<R: Rng>(rng: &mut R, info: &SymbolInfo) -> IndicatorSample {
    let close = rng.gen_range(CLOSE_RANGE.0..CLOSE_RANGE.1);
    let change = rng.gen_range(CHANGE_RANGE.0..CHANGE_RANGE.1);
    let change_percent = change / close * 100.0;

    IndicatorSample {
        symbol: info.symbol.clone(),
        name: info.name.clone(),
        close,
        change,
        change_percent,
        volume: rng.gen_range(VOLUME_RANGE.0..VOLUME_RANGE.1),
        market_cap: rng.gen_range(MARKET_CAP_RANGE.0..MARKET_CAP_RANGE.1),
        mom21: rng.gen_range(MOM21_RANGE.0..MOM21_RANGE.1),
        mom42: rng.gen_range(MOM42_RANGE.0..MOM42_RANGE.1),
        mom63: rng.gen_range(MOM63_RANGE.0..MOM63_RANGE.1),
        rsi14: rng.gen_range(RSI14_RANGE.0..RSI14_RANGE.1),
        atr14: rng.gen_range(ATR14_RANGE.0..ATR14_RANGE.1),
        rvol10: rng.gen_range(RVOL10_RANGE.0..RVOL10_RANGE.1),
        rvol20: rng.gen_range(RVOL20_RANGE.0..RVOL20_RANGE.1),
        sma50: close * rng.gen_range(SMA50_FACTOR_RANGE.0..SMA50_FACTOR_RANGE.1),
        ema21: close * rng.gen_range(EMA21_FACTOR_RANGE.0..EMA21_FACTOR_RANGE.1),
        macd_hist: rng.gen_range(MACD_HIST_RANGE.0..MACD_HIST_RANGE.1),
        vol21: rng.gen_range(VOL21_RANGE.0..VOL21_RANGE.1),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SymbolInfo {
        SymbolInfo::new("TSLA", "Tesla Inc")
    }

    #[test]
    fn sample_carries_identity() {
        let mut rng = thread_rng();
        let s = sample_indicators(&mut rng, &info());
        assert_eq!(s.symbol, "TSLA");
        assert_eq!(s.name, "Tesla Inc");
    }

    #[test]
    fn sampled_fields_stay_in_range() {
        let mut rng = thread_rng();
        for _ in 0..200 {
            let s = sample_indicators(&mut rng, &info());
            assert!((CLOSE_RANGE.0..CLOSE_RANGE.1).contains(&s.close));
            assert!((CHANGE_RANGE.0..CHANGE_RANGE.1).contains(&s.change));
            assert!((MOM21_RANGE.0..MOM21_RANGE.1).contains(&s.mom21));
            assert!((MOM42_RANGE.0..MOM42_RANGE.1).contains(&s.mom42));
            assert!((MOM63_RANGE.0..MOM63_RANGE.1).contains(&s.mom63));
            assert!((RSI14_RANGE.0..RSI14_RANGE.1).contains(&s.rsi14));
            assert!((ATR14_RANGE.0..ATR14_RANGE.1).contains(&s.atr14));
            assert!((RVOL10_RANGE.0..RVOL10_RANGE.1).contains(&s.rvol10));
            assert!((RVOL20_RANGE.0..RVOL20_RANGE.1).contains(&s.rvol20));
            assert!((MACD_HIST_RANGE.0..MACD_HIST_RANGE.1).contains(&s.macd_hist));
            assert!((VOL21_RANGE.0..VOL21_RANGE.1).contains(&s.vol21));
            assert!((VOLUME_RANGE.0..VOLUME_RANGE.1).contains(&s.volume));
            assert!((MARKET_CAP_RANGE.0..MARKET_CAP_RANGE.1).contains(&s.market_cap));
        }
    }

    #[test]
    fn moving_averages_track_close() {
        let mut rng = thread_rng();
        for _ in 0..200 {
            let s = sample_indicators(&mut rng, &info());
            assert!(s.sma50 >= s.close * SMA50_FACTOR_RANGE.0);
            assert!(s.sma50 <= s.close * SMA50_FACTOR_RANGE.1);
            assert!(s.ema21 >= s.close * EMA21_FACTOR_RANGE.0);
            assert!(s.ema21 <= s.close * EMA21_FACTOR_RANGE.1);
        }
    }

    #[test]
    fn change_percent_uses_post_change_close() {
        let mut rng = thread_rng();
        let s = sample_indicators(&mut rng, &info());
        let expected = s.change / s.close * 100.0;
        assert!((s.change_percent - expected).abs() < 1e-12);
    }
}
